//! JWT issuance and verification (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The first registered account is the administrator.
const ADMIN_USER_ID: i64 = 1;

/// Token lifetimes and signing secret
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// Config with default lifetimes: 15 minute access, 30 day refresh.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued directly from a password login rather than a refresh
    pub fresh: bool,
    pub is_admin: bool,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Access + refresh pair returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token creation failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("The token has expired.")]
    Expired,

    #[error("Signature verification failed.")]
    Invalid,
}

pub struct JwtService {
    config: JwtConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    fn claims(&self, user_id: i64, kind: TokenKind, fresh: bool) -> Claims {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
        };

        Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            kind,
            fresh,
            is_admin: user_id == ADMIN_USER_ID,
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(JwtError::Encoding)
    }

    pub fn issue_access(&self, user_id: i64, fresh: bool) -> Result<String, JwtError> {
        self.encode(&self.claims(user_id, TokenKind::Access, fresh))
    }

    /// Fresh access token plus refresh token, for a password login.
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id, true)?,
            refresh_token: self.encode(&self.claims(user_id, TokenKind::Refresh, false))?,
        })
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}
