//! Store endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::MessageResponse;
use crate::db::repos::{Store, StoreDetail, StoreRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidJson, ValidPath};
use crate::http::server::AppState;
use crate::models::StoreName;

/// Create store request
#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

/// GET /store - list all stores
async fn list_stores(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Store>>, ApiError> {
    Ok(Json(StoreRepo::new(&state.pool).list().await?))
}

/// POST /store - create a store
async fn create_store(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let name = StoreName::new(&req.name)?;
    let store = StoreRepo::new(&state.pool).create(name).await?;

    Ok((StatusCode::CREATED, Json(store)))
}

/// GET /store/{store_id} - store with its items and tags
async fn get_store(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(store_id): ValidPath<i64>,
) -> Result<Json<StoreDetail>, ApiError> {
    Ok(Json(StoreRepo::new(&state.pool).get_detail(store_id).await?))
}

/// DELETE /store/{store_id} - delete a store and everything in it
async fn delete_store(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(store_id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    StoreRepo::new(&state.pool).delete(store_id).await?;
    Ok(Json(MessageResponse::new("Store deleted.")))
}

/// Store routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/store", get(list_stores).post(create_store))
        .route("/store/{store_id}", get(get_store).delete(delete_store))
}
