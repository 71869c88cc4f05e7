//! Liveness plus a database round trip (no token required)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

async fn check(pool: &SqlitePool) -> HealthResponse {
    let database = match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!("health check query failed: {}", e);
            "error"
        }
    };

    HealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// GET /health - 503 when the database is unreachable
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let body = check(&state.pool).await;
    let status = if body.database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn reports_database_ok() {
        let pool = create_memory_pool().await.unwrap();
        let body = check(&pool).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");
    }

    #[tokio::test]
    async fn closed_pool_is_degraded() {
        let pool = create_memory_pool().await.unwrap();
        pool.close().await;

        let body = check(&pool).await;
        assert_eq!(body.status, "degraded");
        assert_eq!(body.database, "error");
    }
}
