//! Account and token endpoints
//!
//! `/register` and `/login` are the only routes reachable without a token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::auth::{AuthError, TokenPair};
use crate::db::repos::{BlocklistRepo, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, RefreshUser, ValidJson, ValidPath};
use crate::http::server::AppState;
use crate::models::{Email, Password, Username};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// POST /register
async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let username = Username::new(&req.username)?;
    let email = Email::new(&req.email)?;
    let password = Password::new(&req.password)?;

    let hash = state.passwords.hash(&password).await?;
    let user = UserRepo::new(&state.pool)
        .create(&username, &email, &hash)
        .await?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully.")),
    ))
}

/// POST /login - exchange credentials for a fresh access token and a refresh token
async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let creds = UserRepo::new(&state.pool)
        .find_credentials(&req.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &creds.password).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(Json(state.jwt.issue_pair(creds.id)?))
}

/// POST /refresh - trade a refresh token for a non-fresh access token
///
/// The refresh token is revoked, so each one works once.
async fn refresh(
    RefreshUser(caller): RefreshUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    // Claim the refresh token before issuing; a concurrent refresh that
    // lost the insert gets 401.
    let claimed = BlocklistRepo::new(&state.pool)
        .revoke(&caller.claims.jti)
        .await?;
    if !claimed {
        return Err(AuthError::Revoked.into());
    }

    let access_token = state.jwt.issue_access(caller.user_id, false)?;
    Ok(Json(AccessTokenResponse { access_token }))
}

/// POST /logout - revoke the presented access token
async fn logout(
    AuthUser(caller): AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    BlocklistRepo::new(&state.pool)
        .revoke(&caller.claims.jti)
        .await?;

    Ok(Json(MessageResponse::new("Successfully logged out.")))
}

/// GET /user/{user_id}
async fn get_user(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(user_id): ValidPath<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(UserRepo::new(&state.pool).get(user_id).await?))
}

/// DELETE /user/{user_id}
async fn delete_user(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidPath(user_id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    UserRepo::new(&state.pool).delete(user_id).await?;
    Ok(Json(MessageResponse::new("User deleted.")))
}

/// User and token routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/user/{user_id}", get(get_user).delete(delete_user))
}
