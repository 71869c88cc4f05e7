//! Tag endpoints
//!
//! Tags are scoped to a store and may be linked to items of that store.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::db::repos::{Item, Tag, TagRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidJson, ValidPath};
use crate::http::server::AppState;
use crate::models::TagName;

/// Create tag request
#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// Unlink confirmation with both sides of the removed link
#[derive(Serialize)]
pub struct UnlinkResponse {
    pub message: &'static str,
    pub item: Item,
    pub tag: Tag,
}

/// GET /store/{store_id}/tag - list tags of a store
async fn list_store_tags(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(store_id): ValidPath<i64>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = TagRepo::new(&state.pool).list_for_store(store_id).await?;
    Ok(Json(tags))
}

/// POST /store/{store_id}/tag - create a tag in a store
async fn create_tag(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(store_id): ValidPath<i64>,
    ValidJson(req): ValidJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let name = TagName::new(&req.name)?;
    let tag = TagRepo::new(&state.pool).create(store_id, name).await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// POST /store/{store_id}/tag/{tag_id} - confirm a tag belongs to a store
async fn link_tag_to_store(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath((store_id, tag_id)): ValidPath<(i64, i64)>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = TagRepo::new(&state.pool)
        .link_to_store(store_id, tag_id)
        .await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// POST /item/{item_id}/tag/{tag_id} - link a tag to an item
async fn link_tag_to_item(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath((item_id, tag_id)): ValidPath<(i64, i64)>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = TagRepo::new(&state.pool)
        .link_to_item(item_id, tag_id)
        .await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /item/{item_id}/tag/{tag_id} - unlink a tag from an item
async fn unlink_tag_from_item(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath((item_id, tag_id)): ValidPath<(i64, i64)>,
) -> Result<Json<UnlinkResponse>, ApiError> {
    let (item, tag) = TagRepo::new(&state.pool)
        .unlink_from_item(item_id, tag_id)
        .await?;

    Ok(Json(UnlinkResponse {
        message: "Connection between item and tag has been removed.",
        item,
        tag,
    }))
}

/// GET /tag/{tag_id} - get a single tag
async fn get_tag(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(tag_id): ValidPath<i64>,
) -> Result<Json<Tag>, ApiError> {
    let tag = TagRepo::new(&state.pool).get(tag_id).await?;
    Ok(Json(tag))
}

/// DELETE /tag/{tag_id} - delete a tag no item uses
async fn delete_tag(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(tag_id): ValidPath<i64>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    TagRepo::new(&state.pool).delete(tag_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Tag deleted successfully!")),
    ))
}

/// Tag routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/store/{store_id}/tag",
            get(list_store_tags).post(create_tag),
        )
        .route("/store/{store_id}/tag/{tag_id}", post(link_tag_to_store))
        .route(
            "/item/{item_id}/tag/{tag_id}",
            post(link_tag_to_item).delete(unlink_tag_from_item),
        )
        .route("/tag/{tag_id}", get(get_tag).delete(delete_tag))
}
