//! Revoked token ids
//!
//! Kept in the database so revocation holds across restarts and across
//! processes sharing the same database.

use chrono::Utc;
use sqlx::SqlitePool;

use super::error::DbError;

pub struct BlocklistRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BlocklistRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Revoke a token id.
    ///
    /// Returns false when the id was already revoked, so exactly one of
    /// several concurrent callers sees true.
    pub async fn revoke(&self, jti: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT INTO token_blocklist (jti, revoked_at) VALUES (?, ?) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;

        let newly_revoked = result.rows_affected() == 1;
        if newly_revoked {
            tracing::debug!(jti, "token revoked");
        }
        Ok(newly_revoked)
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM token_blocklist WHERE jti = ?")
            .bind(jti)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn second_revoke_reports_already_revoked() {
        let pool = create_memory_pool().await.unwrap();
        let repo = BlocklistRepo::new(&pool);

        assert!(!repo.is_revoked("abc").await.unwrap());
        assert!(repo.revoke("abc").await.unwrap());
        assert!(!repo.revoke("abc").await.unwrap());
        assert!(repo.is_revoked("abc").await.unwrap());
        assert!(!repo.is_revoked("def").await.unwrap());
    }
}
