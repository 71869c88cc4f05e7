//! Item endpoints
//!
//! Creating needs a fresh token, deleting needs the admin claim.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::MessageResponse;
use crate::db::repos::{Item, ItemChanges, ItemDetail, ItemRepo, NewItem};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, FreshUser, ValidJson, ValidPath};
use crate::http::server::AppState;
use crate::models::{ItemName, Price};

/// Create item request
#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: f64,
    pub store_id: i64,
}

/// Update-or-create item request
#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub store_id: Option<i64>,
}

impl TryFrom<UpdateItemRequest> for ItemChanges {
    type Error = ApiError;

    fn try_from(req: UpdateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name.as_deref().map(ItemName::new).transpose()?,
            price: req.price.map(Price::new).transpose()?,
            store_id: req.store_id,
        })
    }
}

/// GET /item - list all items
async fn list_items(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(ItemRepo::new(&state.pool).list().await?))
}

/// POST /item - create an item in a store
async fn create_item(
    _user: FreshUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let item = NewItem {
        name: ItemName::new(&req.name)?,
        price: Price::new(req.price)?,
        store_id: req.store_id,
    };
    let created = ItemRepo::new(&state.pool).create(item).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /item/{item_id} - item with its tags
async fn get_item(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(item_id): ValidPath<i64>,
) -> Result<Json<ItemDetail>, ApiError> {
    Ok(Json(ItemRepo::new(&state.pool).get_detail(item_id).await?))
}

/// PUT /item/{item_id} - update an item, or create it with this id
async fn put_item(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(item_id): ValidPath<i64>,
    ValidJson(req): ValidJson<UpdateItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let changes = ItemChanges::try_from(req)?;
    let item = ItemRepo::new(&state.pool).upsert(item_id, changes).await?;
    Ok(Json(item))
}

/// DELETE /item/{item_id} - admin only
async fn delete_item(
    AuthUser(caller): AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(item_id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_admin()?;
    ItemRepo::new(&state.pool).delete(item_id).await?;
    Ok(Json(MessageResponse::new("Item deleted.")))
}

/// Item routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/item", get(list_items).post(create_item))
        .route(
            "/item/{item_id}",
            get(get_item).put(put_item).delete(delete_item),
        )
}
