use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resumecraft_common::ResumeRecord;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ResumeRow, UserRow};
use crate::storage::{Store, DUPLICATE_EMAIL};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserRow, AppError> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?)
    }

    async fn create_session(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let pruned = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= $2")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.db)
            .await?
            .rows_affected();
        if pruned > 0 {
            debug!(user_id = %user_id, pruned, "expired sessions removed");
        }

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>, AppError> {
        Ok(
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > $2")
                .bind(token)
                .bind(now)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ResumeRecord::from).collect())
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(ResumeRecord::from))
    }

    async fn insert_resume(&self, id: Uuid, user_id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, full_name, role, email, phone, address, degree, school, edu_years,
                 education, experience, projects, skills, summary, profile_photo_data,
                 template_id, created_at, saved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&record.full_name)
        .bind(&record.role)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.address)
        .bind(&record.degree)
        .bind(&record.school)
        .bind(&record.edu_years)
        .bind(Json(&record.education))
        .bind(Json(&record.experience))
        .bind(Json(&record.projects))
        .bind(&record.skills)
        .bind(&record.summary)
        .bind(&record.profile_photo_data)
        .bind(&record.template_id)
        .bind(record.created_at.unwrap_or(now))
        .bind(record.saved_at.unwrap_or(now))
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn update_resume(&self, id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes SET
                full_name = $2, role = $3, email = $4, phone = $5, address = $6,
                degree = $7, school = $8, edu_years = $9,
                education = $10, experience = $11, projects = $12,
                skills = $13, summary = $14, profile_photo_data = $15,
                template_id = $16, saved_at = $17
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&record.full_name)
        .bind(&record.role)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.address)
        .bind(&record.degree)
        .bind(&record.school)
        .bind(&record.edu_years)
        .bind(Json(&record.education))
        .bind(Json(&record.experience))
        .bind(Json(&record.projects))
        .bind(&record.skills)
        .bind(&record.summary)
        .bind(&record.profile_photo_data)
        .bind(&record.template_id)
        .bind(record.saved_at.unwrap_or_else(Utc::now))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
        Ok(row.into())
    }

    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
