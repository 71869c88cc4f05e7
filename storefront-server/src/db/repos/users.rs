//! User repository
//!
//! Password hashes are loaded only by `find_credentials`.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::error::{is_unique_violation, DbError};
use crate::models::{Email, Username};

const DUPLICATE_USER: &str = "A user with that username or email already exists.";

/// Public user record
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// User id and stored bcrypt hash, for login
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password: String,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user with an already-hashed password.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let mut tx = self.pool.begin().await?;

        let (taken,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username.as_str())
                .bind(email.as_str())
                .fetch_one(&mut *tx)
                .await?;

        if taken > 0 {
            return Err(DbError::Conflict(DUPLICATE_USER.into()));
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password) VALUES (?, ?, ?) RETURNING id, username, email",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict(DUPLICATE_USER.into())
            } else {
                DbError::Sqlx(e)
            }
        })?;

        tx.commit().await?;

        tracing::debug!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DbError> {
        let creds = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password FROM users WHERE username = ?",
        )
        .bind(username.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(creds)
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        tracing::debug!(user_id = id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UserRepo::new(&pool);
        let jo = Username::new("jo").unwrap();
        let email = Email::new("jo@example.com").unwrap();

        let user = repo.create(&jo, &email, "hash").await.unwrap();
        assert_eq!(user.username, "jo");

        let other_email = Email::new("other@example.com").unwrap();
        let err = repo.create(&jo, &other_email, "hash").await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let ann = Username::new("ann").unwrap();
        let err = repo.create(&ann, &email, "hash").await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn credentials_lookup() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UserRepo::new(&pool);
        let user = repo
            .create(
                &Username::new("jo").unwrap(),
                &Email::new("jo@example.com").unwrap(),
                "stored-hash",
            )
            .await
            .unwrap();

        let creds = repo.find_credentials("jo").await.unwrap().unwrap();
        assert_eq!(creds.id, user.id);
        assert_eq!(creds.password, "stored-hash");
        assert!(repo.find_credentials("nobody").await.unwrap().is_none());
    }
}
