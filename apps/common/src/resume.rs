use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template used when a record does not name one.
pub const DEFAULT_TEMPLATE_ID: &str = "1";

fn default_template_id() -> String {
    DEFAULT_TEMPLATE_ID.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub years: String,
}

impl EducationEntry {
    pub fn is_blank(&self) -> bool {
        self.degree.is_empty() && self.school.is_empty() && self.years.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub description: String,
}

impl ExperienceEntry {
    pub fn is_blank(&self) -> bool {
        self.job_title.is_empty()
            && self.company.is_empty()
            && self.years.is_empty()
            && self.description.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

impl ProjectEntry {
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

/// A persisted resume, in the shape used on the wire and in local storage.
///
/// `degree`, `school` and `eduYears` are the single-education fields of records
/// written before multi-entry education existed. They mirror the first entry of
/// `education` and are only read back when `education` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub edu_years: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub profile_photo_data: Option<String>,
    #[serde(default = "default_template_id")]
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for ResumeRecord {
    fn default() -> Self {
        Self {
            id: None,
            user_id: None,
            full_name: String::new(),
            role: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            degree: String::new(),
            school: String::new(),
            edu_years: String::new(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            skills: String::new(),
            summary: String::new(),
            profile_photo_data: None,
            template_id: default_template_id(),
            created_at: None,
            saved_at: None,
        }
    }
}

/// Required fields that were empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill in the required fields before saving: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl ResumeRecord {
    /// Checks the fields every saved resume must carry: full name and role.
    pub fn validate_required(&self) -> Result<(), MissingFields> {
        let mut missing = Vec::new();
        if self.full_name.trim().is_empty() {
            missing.push("name");
        }
        if self.role.trim().is_empty() {
            missing.push("role");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingFields(missing))
        }
    }

    /// Education entries, falling back to the legacy single-entry fields.
    pub fn education_entries(&self) -> Vec<EducationEntry> {
        if !self.education.is_empty() {
            return self.education.clone();
        }
        let legacy = EducationEntry {
            degree: self.degree.clone(),
            school: self.school.clone(),
            years: self.edu_years.clone(),
        };
        if legacy.is_blank() {
            Vec::new()
        } else {
            vec![legacy]
        }
    }

    /// Mirrors the first education entry into the legacy fields.
    pub fn sync_legacy_education(&mut self) {
        let first = self.education.first().cloned().unwrap_or_default();
        self.degree = first.degree;
        self.school = first.school;
        self.edu_years = first.years;
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Partial update: only the fields present in the request body are applied.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePatch {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub degree: Option<String>,
    pub school: Option<String>,
    pub edu_years: Option<String>,
    pub education: Option<Vec<EducationEntry>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub projects: Option<Vec<ProjectEntry>>,
    pub skills: Option<String>,
    pub summary: Option<String>,
    pub profile_photo_data: Option<String>,
    pub template_id: Option<String>,
}

impl ResumePatch {
    pub fn apply(self, record: &mut ResumeRecord) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { record.$field = v; })*
            };
        }
        merge!(
            full_name, role, email, phone, address, degree, school, edu_years, education,
            experience, projects, skills, summary, template_id
        );
        if let Some(photo) = self.profile_photo_data {
            record.profile_photo_data = Some(photo);
        }
    }
}
