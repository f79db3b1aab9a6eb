pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::errors::AppError;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.max_body_bytes;

    // Every handler here takes an `AuthUser`, so a missing or stale token is a 401.
    let authenticated = Router::new()
        .route(
            "/api/resumes",
            get(resumes::handle_list).post(resumes::handle_create),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get)
                .put(resumes::handle_update)
                .delete(resumes::handle_delete),
        );

    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/signin", post(auth::handle_signin));

    Router::new()
        .merge(authenticated)
        .merge(public)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::storage::{MemoryStore, Store};

    fn app_with_store() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            store: store.clone(),
            config: Config::for_tests(),
        };
        (build_router(state), store)
    }

    fn app() -> Router {
        app_with_store().0
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn sign_up(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"name": "Jane Doe", "email": email, "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_resume(app: &Router, token: &str, name: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/resumes",
            Some(token),
            Some(json!({
                "fullName": name,
                "role": "Engineer",
                "skills": "Go, SQL",
                "education": [{"degree": "BSc", "school": "MIT", "years": "2010-2014"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resumecraft-api");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(&app(), Method::GET, "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_signup_contract() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"name": "  Jane Doe ", "email": " Jane@Example.COM ", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Account created successfully");
        assert_eq!(body["user"]["name"], "Jane Doe");
        assert_eq!(body["user"]["email"], "jane@example.com");
        assert!(body["user"]["userId"].is_string());
        assert_eq!(body["token"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_signup_rejections_are_400() {
        let app = app();
        sign_up(&app, "jane@example.com").await;

        let cases = [
            json!({"name": "", "email": "a@b.com", "password": "secret1"}),
            json!({"name": "A", "email": "a@b.com"}),
            json!({"name": "A", "email": "a@b.com", "password": "short"}),
            json!({"name": "Jane", "email": "JANE@example.com", "password": "secret1"}),
        ];
        for case in cases {
            let (status, body) =
                send(&app, Method::POST, "/api/auth/signup", None, Some(case)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"]["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_signin_contract() {
        let app = app();
        sign_up(&app, "jane@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"email": "JANE@example.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "jane@example.com");
        let token = body["token"].as_str().unwrap();
        let (status, _) = send(&app, Method::GET, "/api/resumes", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"email": "jane@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for (email, password) in [("jane@example.com", "wrong-pass"), ("who@example.com", "secret1")] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/api/auth/signin",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"]["message"], "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn test_resumes_require_valid_token() {
        let (app, store) = app_with_store();
        let (status, _) = send(&app, Method::GET, "/api/resumes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/api/resumes", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let user = store
            .create_user("Old", "old@example.com", "hash")
            .await
            .unwrap();
        store
            .create_session("expired", user.id, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        let (status, _) = send(&app, Method::GET, "/api/resumes", Some("expired"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_role() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/resumes",
            Some(&token),
            Some(json!({"fullName": "Jane", "role": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("role"));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;
        let created = create_resume(&app, &token, "Jane Doe").await;

        assert_eq!(created["degree"], "BSc");
        assert!(created["createdAt"].is_string());
        assert!(created["savedAt"].is_string());

        let id = created["id"].as_str().unwrap();
        let (status, fetched) =
            send(&app, Method::GET, &format!("/api/resumes/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;
        create_resume(&app, &token, "First").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        create_resume(&app, &token, "Second").await;

        let (status, body) = send(&app, Method::GET, "/api/resumes", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["fullName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_ownership_403_and_missing_404() {
        let app = app();
        let owner = sign_up(&app, "jane@example.com").await;
        let other = sign_up(&app, "john@example.com").await;
        let created = create_resume(&app, &owner, "Jane Doe").await;
        let uri = format!("/api/resumes/{}", created["id"].as_str().unwrap());

        for method in [Method::GET, Method::DELETE] {
            let (status, _) = send(&app, method, &uri, Some(&other), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }
        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&other),
            Some(json!({"fullName": "Hijacked"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let missing = format!("/api/resumes/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::GET, &missing, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::GET, "/api/resumes/not-a-uuid", Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_merges_present_fields() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;
        let created = create_resume(&app, &token, "Jane Doe").await;
        let uri = format!("/api/resumes/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"summary": "Builds things", "templateId": "2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["summary"], "Builds things");
        assert_eq!(updated["templateId"], "2");
        assert_eq!(updated["fullName"], "Jane Doe");
        assert_eq!(updated["skills"], "Go, SQL");
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let (status, _) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({"fullName": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_body_and_gone_afterwards() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;
        let created = create_resume(&app, &token, "Jane Doe").await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/api/resumes/{id}");

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Resume deleted successfully");
        assert_eq!(body["deletedId"], id);

        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
