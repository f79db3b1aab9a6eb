use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// Body returned by both sign-up and sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// The authenticated session persisted client-side after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<AuthResponse> for AuthSession {
    fn from(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            user_id: resp.user.user_id,
            name: resp.user.name,
            email: resp.user.email,
        }
    }
}
