//! Shared harness: router over a fresh in-memory database per test.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use storefront_server::db::{create_memory_pool, create_pool, migrations};
use storefront_server::{build_router, AppState, JwtConfig, PasswordHasher, ServerConfig};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

pub async fn spawn() -> TestApp {
    let pool = create_memory_pool().await.expect("in-memory pool");
    with_pool(pool)
}

/// App over a file database with a multi-connection pool, for tests that
/// need requests to run concurrently. Keep the `TempDir` alive.
pub async fn spawn_file() -> (TestApp, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("store.db").display());
    let pool = create_pool(&url).await.expect("file pool");
    migrations::run(&pool).await.expect("migrations");
    (with_pool(pool), dir)
}

fn with_pool(pool: SqlitePool) -> TestApp {
    let state = AppState::new(
        pool.clone(),
        JwtConfig::new(SECRET),
        PasswordHasher::with_cost(4),
    );
    let router = build_router(state, &ServerConfig::default());
    TestApp { router, pool }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register `username` and log in with it.
    pub async fn login_as(&self, username: &str) -> Tokens {
        let (status, _) = self
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "hunter2",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}", username);

        let (status, body) = self
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": "hunter2" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {}", username);

        Tokens {
            access: body["access_token"].as_str().unwrap().to_owned(),
            refresh: body["refresh_token"].as_str().unwrap().to_owned(),
        }
    }

    pub async fn create_store(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/store", token, Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, token: &str, store_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/item",
                token,
                Some(json!({ "name": name, "price": 9.99, "store_id": store_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_tag(&self, token: &str, store_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .post(
                &format!("/store/{}/tag", store_id),
                token,
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }
}
