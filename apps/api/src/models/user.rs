use chrono::{DateTime, Utc};
use resumecraft_common::UserInfo;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            user_id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
