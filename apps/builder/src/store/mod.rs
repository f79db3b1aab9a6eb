//! Resume Store Client: remote persistence with a local fallback.
//!
//! Every remote failure comes back as an explicit [`RemoteError`]; the
//! fallback decision is made here. Network, HTTP and credential failures
//! fall back to local storage. A forbidden outcome never does.

pub mod local;
pub mod remote;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use resumecraft_common::{AuthSession, MissingFields, ResumeRecord, SigninRequest, SignupRequest};

pub use local::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use remote::{HttpResumeApi, RemoteError, ResumeApi};

/// Storage key of the locally saved record list.
pub const RESUMES_KEY: &str = "resumeCraftResumes";
/// Storage key of the signed-in session.
pub const SESSION_KEY: &str = "resumeCraftAuth";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] MissingFields),

    #[error("resume {0} belongs to another user")]
    Forbidden(String),

    #[error("resume {0} not found")]
    NotFound(String),

    #[error("local storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("the remote API is disabled")]
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLocation {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub id: String,
    pub location: SaveLocation,
    pub record: ResumeRecord,
}

pub struct ResumeStore<S> {
    api: Option<Arc<dyn ResumeApi>>,
    local: S,
}

impl<S: KeyValueStorage> ResumeStore<S> {
    pub fn new(api: Option<Arc<dyn ResumeApi>>, local: S) -> Self {
        Self { api, local }
    }

    /// Local-only store.
    pub fn offline(local: S) -> Self {
        Self::new(None, local)
    }

    pub fn local(&self) -> &S {
        &self.local
    }

    fn api(&self) -> Result<&Arc<dyn ResumeApi>, StoreError> {
        self.api.as_ref().ok_or(StoreError::Offline)
    }

    // ──────────────────────────────────────────────
    // Session
    // ──────────────────────────────────────────────

    pub fn session(&self) -> Option<AuthSession> {
        match self.local.get::<AuthSession>(SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    fn current_user(&self) -> Option<String> {
        self.session().map(|s| s.user_id)
    }

    /// The API client together with a token, when both exist.
    fn remote(&self) -> Option<(&Arc<dyn ResumeApi>, String)> {
        let api = self.api.as_ref()?;
        let session = self.session()?;
        Some((api, session.token))
    }

    pub async fn sign_up(&self, request: &SignupRequest) -> Result<AuthSession, StoreError> {
        let response = self.api()?.sign_up(request).await?;
        self.persist_session(response.into())
    }

    pub async fn sign_in(&self, request: &SigninRequest) -> Result<AuthSession, StoreError> {
        let response = self.api()?.sign_in(request).await?;
        self.persist_session(response.into())
    }

    fn persist_session(&self, session: AuthSession) -> Result<AuthSession, StoreError> {
        self.local.set(SESSION_KEY, &session)?;
        info!("Signed in as {} ({})", session.email, session.user_id);
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.local.delete(SESSION_KEY)?;
        info!("Signed out");
        Ok(())
    }

    // ──────────────────────────────────────────────
    // Records
    // ──────────────────────────────────────────────

    /// The stored list for a read-modify-write. An unreadable list is an
    /// error so it is never overwritten.
    fn read_local(&self) -> Result<Vec<ResumeRecord>, StoreError> {
        Ok(self
            .local
            .get::<Vec<ResumeRecord>>(RESUMES_KEY)?
            .unwrap_or_default())
    }

    /// The stored list for display only; an unreadable list reads as empty.
    fn read_local_lenient(&self) -> Result<Vec<ResumeRecord>, StoreError> {
        match self.read_local() {
            Err(StoreError::Storage(StorageError::Corrupt { source, .. })) => {
                warn!("Local resume list is unreadable: {}", source);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn refuse(&self, id: &str, action: &str) -> StoreError {
        error!(
            "Refusing to {} resume {}: not owned by {}",
            action,
            id,
            self.current_user().as_deref().unwrap_or("anonymous user")
        );
        StoreError::Forbidden(id.to_string())
    }

    /// Validates, then saves remotely when signed in, falling back to local
    /// storage on any failure except a forbidden outcome.
    pub async fn save(&self, mut record: ResumeRecord) -> Result<SaveOutcome, StoreError> {
        record.validate_required()?;
        record.sync_legacy_education();
        record.saved_at = Some(Utc::now());

        if let Some((api, token)) = self.remote() {
            let result = match record.id.as_deref() {
                Some(id) => api.update(&token, id, &record).await,
                None => api.create(&token, &record).await,
            };
            match result {
                Ok(saved) => match saved.id.clone() {
                    Some(id) => {
                        info!("Saved resume {} remotely", id);
                        return Ok(SaveOutcome {
                            id,
                            location: SaveLocation::Remote,
                            record: saved,
                        });
                    }
                    None => warn!("Remote save returned no id, saving locally"),
                },
                Err(RemoteError::Forbidden(_)) => {
                    let id = record.id.clone().unwrap_or_default();
                    return Err(self.refuse(&id, "save"));
                }
                Err(e) => warn!("Remote save failed, saving locally: {}", e),
            }
        }
        self.save_local(record)
    }

    /// Upserts into the local list by id. New records get a fresh id; an
    /// existing record keeps its `createdAt`.
    pub fn save_local(&self, mut record: ResumeRecord) -> Result<SaveOutcome, StoreError> {
        let now = Utc::now();
        let user = self.current_user();
        let mut records = self.read_local()?;

        record.user_id = user.clone();
        record.saved_at = record.saved_at.or(Some(now));

        let existing = record
            .id
            .as_deref()
            .and_then(|id| records.iter().position(|r| r.id.as_deref() == Some(id)));
        let id = match existing {
            Some(position) => {
                let current = &records[position];
                let id = current.id.clone().unwrap_or_default();
                if current.user_id != user {
                    return Err(self.refuse(&id, "overwrite"));
                }
                record.created_at = current.created_at.or(record.created_at).or(Some(now));
                records[position] = record.clone();
                id
            }
            None => {
                let id = record
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                record.id = Some(id.clone());
                record.created_at = record.created_at.or(Some(now));
                records.push(record.clone());
                id
            }
        };

        self.local.set(RESUMES_KEY, &records)?;
        info!("Saved resume {} locally", id);
        Ok(SaveOutcome {
            id,
            location: SaveLocation::Local,
            record,
        })
    }

    /// The current user's records, newest first.
    pub async fn list(&self) -> Result<Vec<ResumeRecord>, StoreError> {
        if let Some((api, token)) = self.remote() {
            match api.list(&token).await {
                Ok(records) => return Ok(records),
                Err(e) => warn!("Remote list failed, reading local resumes: {}", e),
            }
        }
        let user = self.current_user();
        let mut records: Vec<ResumeRecord> = self
            .read_local_lenient()?
            .into_iter()
            .filter(|r| r.user_id == user)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn load(&self, id: &str) -> Result<ResumeRecord, StoreError> {
        if let Some((api, token)) = self.remote() {
            match api.fetch(&token, id).await {
                Ok(record) => return Ok(record),
                Err(RemoteError::Forbidden(_)) => return Err(self.refuse(id, "open")),
                Err(e) => warn!("Remote load of {} failed, checking local storage: {}", id, e),
            }
        }
        let record = self
            .read_local_lenient()?
            .into_iter()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.user_id != self.current_user() {
            return Err(self.refuse(id, "open"));
        }
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if let Some((api, token)) = self.remote() {
            match api.delete(&token, id).await {
                Ok(()) => {
                    info!("Deleted resume {} remotely", id);
                    return Ok(());
                }
                Err(RemoteError::Forbidden(_)) => return Err(self.refuse(id, "delete")),
                Err(e) => {
                    if !self.has_local(id)? {
                        return Err(e.into());
                    }
                    warn!("Remote delete of {} failed, deleting local copy: {}", id, e);
                }
            }
        }
        self.delete_local(id)
    }

    fn has_local(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.read_local()?.iter().any(|r| r.id.as_deref() == Some(id)))
    }

    fn delete_local(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.read_local()?;
        let position = records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if records[position].user_id != self.current_user() {
            return Err(self.refuse(id, "delete"));
        }
        records.remove(position);
        self.local.set(RESUMES_KEY, &records)?;
        info!("Deleted resume {} locally", id);
        Ok(())
    }
}
