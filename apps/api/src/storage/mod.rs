//! Persistence behind a trait so handlers run against PostgreSQL in production
//! and an in-memory store in tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resumecraft_common::ResumeRecord;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::UserRow;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const DUPLICATE_EMAIL: &str = "An account with this email already exists";

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `AppError::Conflict` when the e-mail is taken.
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserRow, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    async fn create_session(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    /// The user a token belongs to, unless it is unknown or expired at `now`.
    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>, AppError>;

    /// The user's resumes, newest `created_at` first.
    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError>;

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError>;

    async fn insert_resume(&self, id: Uuid, user_id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError>;

    async fn update_resume(&self, id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError>;

    /// Returns whether a row was removed.
    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError>;
}
