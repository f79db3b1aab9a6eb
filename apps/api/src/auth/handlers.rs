use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use resumecraft_common::{AuthResponse, SigninRequest, SignupRequest};
use tracing::{info, warn};

use crate::auth::password::{hash_password_async, verify_password_async};
use crate::auth::token::generate_token;
use crate::errors::AppError;
use crate::models::UserRow;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;
const BAD_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn issue_session(state: &AppState, user: &UserRow, message: &str) -> Result<AuthResponse, AppError> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::days(state.config.session_ttl_days);
    state.store.create_session(&token, user.id, expires_at).await?;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: user.info(),
    })
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let name = req.name.trim();
    let email = normalize_email(&req.email);

    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password_async(req.password).await?;
    let user = state.store.create_user(name, &email, &password_hash).await?;
    info!(user_id = %user.id, "account created");

    let response = issue_session(&state, &user, "Account created successfully").await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/signin
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!("sign-in for unknown email");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };
    if !verify_password_async(req.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "sign-in with wrong password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    info!(user_id = %user.id, "signed in");
    Ok(Json(issue_session(&state, &user, "Signed in successfully").await?))
}
