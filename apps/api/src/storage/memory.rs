use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resumecraft_common::ResumeRecord;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::UserRow;
use crate::storage::{Store, DUPLICATE_EMAIL};

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    resumes: HashMap<Uuid, ResumeRecord>,
}

/// Process-local store used by the router tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserRow, AppError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let user = UserRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(self.tables()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_session(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tables = self.tables()?;
        tables
            .sessions
            .retain(|_, (owner, expires)| *owner != user_id || *expires > now);
        tables.sessions.insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>, AppError> {
        Ok(self
            .tables()?
            .sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
        let owner = user_id.to_string();
        let mut records: Vec<ResumeRecord> = self
            .tables()?
            .resumes
            .values()
            .filter(|r| r.is_owned_by(&owner))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        Ok(self.tables()?.resumes.get(&id).cloned())
    }

    async fn insert_resume(&self, id: Uuid, user_id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError> {
        let now = Utc::now();
        let mut stored = record.clone();
        stored.id = Some(id.to_string());
        stored.user_id = Some(user_id.to_string());
        stored.created_at.get_or_insert(now);
        stored.saved_at.get_or_insert(now);
        self.tables()?.resumes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_resume(&self, id: Uuid, record: &ResumeRecord) -> Result<ResumeRecord, AppError> {
        let mut tables = self.tables()?;
        let existing = tables
            .resumes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
        let mut stored = record.clone();
        stored.id = existing.id.clone();
        stored.user_id = existing.user_id.clone();
        stored.created_at = existing.created_at;
        stored.saved_at = Some(record.saved_at.unwrap_or_else(Utc::now));
        *existing = stored.clone();
        Ok(stored)
    }

    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables()?.resumes.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user("Jane", "jane@x.com", "h").await.unwrap();
        let err = store.create_user("Jane", "jane@x.com", "h").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();
        store.create_session("live", user, now + Duration::days(1)).await.unwrap();
        store.create_session("stale", user, now - Duration::seconds(1)).await.unwrap();

        assert_eq!(store.session_user("live", now).await.unwrap(), Some(user));
        assert_eq!(store.session_user("stale", now).await.unwrap(), None);
        assert_eq!(store.session_user("missing", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_new_session_prunes_expired_ones_of_same_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.create_session("stale", user, now - Duration::days(1)).await.unwrap();
        store.create_session("other-stale", other, now - Duration::days(1)).await.unwrap();
        store.create_session("still-live", user, now + Duration::days(1)).await.unwrap();

        store.create_session("fresh", user, now + Duration::days(7)).await.unwrap();

        let tables = store.tables().unwrap();
        let mut tokens: Vec<&str> = tables.sessions.keys().map(String::as_str).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["fresh", "other-stale", "still-live"]);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let base = Utc::now();
        for (offset, name) in [(0, "old"), (2, "new"), (1, "mid")] {
            let record = ResumeRecord {
                full_name: name.to_string(),
                created_at: Some(base + Duration::seconds(offset)),
                ..Default::default()
            };
            store.insert_resume(Uuid::new_v4(), owner, &record).await.unwrap();
        }
        store
            .insert_resume(Uuid::new_v4(), Uuid::new_v4(), &ResumeRecord::default())
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_resumes(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.full_name)
            .collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_creation_time() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let created = store.insert_resume(id, owner, &ResumeRecord::default()).await.unwrap();

        let replacement = ResumeRecord {
            full_name: "Janet".to_string(),
            user_id: Some("someone-else".to_string()),
            ..Default::default()
        };
        let updated = store.update_resume(id, &replacement).await.unwrap();
        assert_eq!(updated.full_name, "Janet");
        assert_eq!(updated.user_id, Some(owner.to_string()));
        assert_eq!(updated.created_at, created.created_at);
    }
}
