use chrono::{DateTime, Utc};
use resumecraft_common::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeRecord};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `resumes`; entry lists live in JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub degree: String,
    pub school: String,
    pub edu_years: String,
    pub education: Json<Vec<EducationEntry>>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub projects: Json<Vec<ProjectEntry>>,
    pub skills: String,
    pub summary: String,
    pub profile_photo_data: Option<String>,
    pub template_id: String,
    pub created_at: DateTime<Utc>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        ResumeRecord {
            id: Some(row.id.to_string()),
            user_id: Some(row.user_id.to_string()),
            full_name: row.full_name,
            role: row.role,
            email: row.email,
            phone: row.phone,
            address: row.address,
            degree: row.degree,
            school: row.school,
            edu_years: row.edu_years,
            education: row.education.0,
            experience: row.experience.0,
            projects: row.projects.0,
            skills: row.skills,
            summary: row.summary,
            profile_photo_data: row.profile_photo_data,
            template_id: row.template_id,
            created_at: Some(row.created_at),
            saved_at: row.saved_at,
        }
    }
}
