//! Repository error type

use crate::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Uniqueness or delete-guard violation
    #[error("{0}")]
    Conflict(String),

    /// Entities exist but may not be combined
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// True when the error is a UNIQUE / PRIMARY KEY constraint failure.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
