use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use resumecraft_common::{ResumePatch, ResumeRecord};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_id: String,
}

fn not_found() -> AppError {
    AppError::NotFound("Resume not found".to_string())
}

/// Validates and aligns the legacy single-education fields with the entry list.
fn normalize(record: &mut ResumeRecord) -> Result<(), AppError> {
    record
        .validate_required()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    record.education = record.education_entries();
    record.sync_legacy_education();
    Ok(())
}

/// Loads a resume and checks it belongs to the caller. Ids that are not UUIDs cannot exist.
async fn owned_resume(state: &AppState, user: AuthUser, id: &str) -> Result<(Uuid, ResumeRecord), AppError> {
    let id = Uuid::parse_str(id).map_err(|_| not_found())?;
    let record = state.store.get_resume(id).await?.ok_or_else(not_found)?;
    if !record.is_owned_by(&user.user_id.to_string()) {
        error!(resume_id = %id, user_id = %user.user_id, "access to another user's resume refused");
        return Err(AppError::Forbidden);
    }
    Ok((id, record))
}

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.store.list_resumes(user.user_id).await?))
}

/// POST /api/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut record): Json<ResumeRecord>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    normalize(&mut record)?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    record.id = None;
    record.user_id = None;
    record.created_at = Some(now);
    record.saved_at = Some(now);

    let created = state.store.insert_resume(id, user.user_id, &record).await?;
    info!(resume_id = %id, user_id = %user.user_id, "resume created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let (_, record) = owned_resume(&state, user, &id).await?;
    Ok(Json(record))
}

/// PUT /api/resumes/:id
/// Only the fields present in the body are changed.
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ResumePatch>,
) -> Result<Json<ResumeRecord>, AppError> {
    let (id, mut record) = owned_resume(&state, user, &id).await?;

    patch.apply(&mut record);
    normalize(&mut record)?;
    record.saved_at = Some(Utc::now());

    let updated = state.store.update_resume(id, &record).await?;
    info!(resume_id = %id, "resume updated");
    Ok(Json(updated))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let (id, _) = owned_resume(&state, user, &id).await?;
    if !state.store.delete_resume(id).await? {
        return Err(not_found());
    }
    info!(resume_id = %id, "resume deleted");
    Ok(Json(DeleteResponse {
        message: "Resume deleted successfully".to_string(),
        deleted_id: id.to_string(),
    }))
}
