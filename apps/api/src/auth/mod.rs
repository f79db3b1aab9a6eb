//! Account sign-up/sign-in and bearer-token resolution.

pub mod handlers;
pub mod password;
pub mod token;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing or malformed bearer token".to_string()))?;

        let user_id = state
            .store
            .session_user(token, Utc::now())
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
