//! Client for the resume API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use resumecraft_common::{AuthResponse, ResumeRecord, SigninRequest, SignupRequest};

/// Outcome of a failed remote call. The caller decides whether to fall back.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ResumeApi: Send + Sync {
    async fn sign_up(&self, request: &SignupRequest) -> Result<AuthResponse, RemoteError>;

    async fn sign_in(&self, request: &SigninRequest) -> Result<AuthResponse, RemoteError>;

    async fn list(&self, token: &str) -> Result<Vec<ResumeRecord>, RemoteError>;

    async fn fetch(&self, token: &str, id: &str) -> Result<ResumeRecord, RemoteError>;

    async fn create(&self, token: &str, record: &ResumeRecord) -> Result<ResumeRecord, RemoteError>;

    async fn update(&self, token: &str, id: &str, record: &ResumeRecord) -> Result<ResumeRecord, RemoteError>;

    async fn delete(&self, token: &str, id: &str) -> Result<(), RemoteError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Pulls a human-readable message out of an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .or_else(|_| serde_json::from_str::<MessageBody>(body).map(|m| m.message))
        .unwrap_or_else(|_| body.to_string())
}

fn status_error(status: u16, message: String) -> RemoteError {
    match status {
        401 => RemoteError::Unauthorized(message),
        403 => RemoteError::Forbidden(message),
        404 => RemoteError::NotFound(message),
        _ => RemoteError::Http { status, message },
    }
}

/// `ResumeApi` over HTTP with bearer credentials.
#[derive(Clone)]
pub struct HttpResumeApi {
    client: Client,
    base_url: String,
}

impl HttpResumeApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        debug!("Resume API returned {}: {}", status, body);
        Err(status_error(status.as_u16(), error_message(&body)))
    }
}

#[async_trait]
impl ResumeApi for HttpResumeApi {
    async fn sign_up(&self, request: &SignupRequest) -> Result<AuthResponse, RemoteError> {
        self.send(self.client.post(self.url("/auth/signup")).json(request))
            .await
    }

    async fn sign_in(&self, request: &SigninRequest) -> Result<AuthResponse, RemoteError> {
        self.send(self.client.post(self.url("/auth/signin")).json(request))
            .await
    }

    async fn list(&self, token: &str) -> Result<Vec<ResumeRecord>, RemoteError> {
        self.send(self.client.get(self.url("/resumes")).bearer_auth(token))
            .await
    }

    async fn fetch(&self, token: &str, id: &str) -> Result<ResumeRecord, RemoteError> {
        self.send(
            self.client
                .get(self.url(&format!("/resumes/{id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn create(&self, token: &str, record: &ResumeRecord) -> Result<ResumeRecord, RemoteError> {
        self.send(
            self.client
                .post(self.url("/resumes"))
                .bearer_auth(token)
                .json(record),
        )
        .await
    }

    async fn update(&self, token: &str, id: &str, record: &ResumeRecord) -> Result<ResumeRecord, RemoteError> {
        self.send(
            self.client
                .put(self.url(&format!("/resumes/{id}")))
                .bearer_auth(token)
                .json(record),
        )
        .await
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), RemoteError> {
        let _: serde_json::Value = self
            .send(
                self.client
                    .delete(self.url(&format!("/resumes/{id}")))
                    .bearer_auth(token),
            )
            .await?;
        Ok(())
    }
}
