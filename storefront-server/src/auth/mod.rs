//! Authentication: token issuance, password hashing, and the 401 taxonomy.
//!
//! Request-level checks live in `http::extractors`.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenKind, TokenPair};
pub use password::{PasswordError, PasswordHasher};

/// Reasons a request is refused with 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Expired,
    Revoked,
    NotFresh,
    WrongTokenKind { expected: TokenKind },
    InvalidCredentials,
    AdminRequired,
}

impl AuthError {
    /// Stable machine-readable code for the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "authorization_required",
            Self::InvalidToken | Self::WrongTokenKind { .. } => "invalid_token",
            Self::Expired => "token_expired",
            Self::Revoked => "token_revoked",
            Self::NotFresh => "fresh_token_required",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AdminRequired => "admin_required",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Request does not contain an access token.",
            Self::InvalidToken => "Signature verification failed.",
            Self::Expired => "The token has expired.",
            Self::Revoked => "The token has been revoked.",
            Self::NotFresh => "The token is not fresh.",
            Self::WrongTokenKind {
                expected: TokenKind::Access,
            } => "Only access tokens are allowed.",
            Self::WrongTokenKind {
                expected: TokenKind::Refresh,
            } => "Only refresh tokens are allowed.",
            Self::InvalidCredentials => "Invalid credentials.",
            Self::AdminRequired => "Admin privilege required.",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_kind_reports_invalid_token() {
        let err = AuthError::WrongTokenKind {
            expected: TokenKind::Refresh,
        };
        assert_eq!(err.code(), "invalid_token");
        assert_eq!(err.to_string(), "Only refresh tokens are allowed.");
    }
}
