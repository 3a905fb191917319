#![allow(dead_code)]

use axum::Router;
use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::Arc;
use task_board_api::{SharedData, auth, db, persistence, routes};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "hunter22";

/// A fresh in-memory database with every migration applied. Each call gets its own database.
pub async fn prepare_db() -> SqlitePool {
    let pool = db::connect_sqlx("sqlite::memory:")
        .await
        .unwrap_or_else(|err| panic!("Failed to open test database: {err:#}"));
    db::run_migrations(&pool)
        .await
        .unwrap_or_else(|err| panic!("Failed to migrate test database: {err:#}"));

    pool
}

/// The full application router on top of a fresh database
pub async fn test_app() -> Router {
    let ext_cxn = persistence::ExternalConnectivity::new(prepare_db().await);
    let shared_data = Arc::new(SharedData {
        ext_cxn,
        token_keys: auth::TokenKeys::new(b"integration-test-secret", Duration::minutes(10)),
    });

    routes::build_router(shared_data)
}

/// Sends one request through the router and returns the status along with the parsed JSON body.
/// An empty body comes back as [Value::Null].
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json_body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Test request should be well formed");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router should always produce a response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read data from response body!");
    if bytes.is_empty() {
        return (status, Value::Null);
    }

    let parsed = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!("Response body was not JSON! Error: {err}, Received body: {bytes:?}")
    });
    (status, parsed)
}

/// Registers an account and hands back its bearer token and user ID
pub async fn register(app: &Router, email: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD, "name": name })),
    )
    .await;
    assert_eq!(StatusCode::OK, status, "registration failed: {body}");

    let token = body["token"].as_str().expect("token should be a string").to_owned();
    let user_id = body["user"]["id"].as_str().expect("user ID should be a string").to_owned();
    (token, user_id)
}

/// Creates a task from the given JSON and returns its ID
pub async fn create_task(app: &Router, token: &str, task: Value) -> String {
    let (status, body) = send(app, Method::POST, "/api/tasks", Some(token), Some(task)).await;
    assert_eq!(StatusCode::CREATED, status, "task creation failed: {body}");

    body["id"].as_str().expect("task ID should be a string").to_owned()
}
