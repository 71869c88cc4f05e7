//! Custom Axum extractors
//!
//! Bearer-token authentication, plus path and body extractors whose
//! rejections use the JSON error body.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{AuthError, Claims, TokenKind};
use crate::db::repos::BlocklistRepo;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the bearer token, its kind, and that it has not been revoked.
async fn authenticate(parts: &Parts, state: &AppState, expected: TokenKind) -> Result<Caller, ApiError> {
    let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
    let claims = state.jwt.verify(token)?;

    if claims.kind != expected {
        return Err(AuthError::WrongTokenKind { expected }.into());
    }

    let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

    if BlocklistRepo::new(&state.pool).is_revoked(&claims.jti).await? {
        return Err(AuthError::Revoked.into());
    }

    Ok(Caller { user_id, claims })
}

/// Identity behind a verified token
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub claims: Claims,
}

impl Caller {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.claims.is_admin {
            Ok(())
        } else {
            Err(AuthError::AdminRequired.into())
        }
    }
}

/// Any valid, non-revoked access token
pub struct AuthUser(pub Caller);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, TokenKind::Access).await.map(Self)
    }
}

/// Access token issued directly by a password login
pub struct FreshUser(pub Caller);

impl FromRequestParts<Arc<AppState>> for FreshUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let caller = authenticate(parts, state, TokenKind::Access).await?;
        if !caller.claims.fresh {
            return Err(AuthError::NotFresh.into());
        }
        Ok(Self(caller))
    }
}

/// Valid, non-revoked refresh token
pub struct RefreshUser(pub Caller);

impl FromRequestParts<Arc<AppState>> for RefreshUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, TokenKind::Refresh).await.map(Self)
    }
}

/// Path parameters; parse failures are 400 `validation_error`
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// JSON request body; syntax, content-type, and missing-field errors are 400
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
