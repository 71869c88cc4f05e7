//! Store repository
//!
//! Deleting a store cascades to its items, tags, and their join rows.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::error::{is_unique_violation, DbError};
use super::items::Item;
use super::tags::Tag;
use crate::models::StoreName;

/// Store record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
}

/// Store with everything it owns
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetail {
    pub id: i64,
    pub name: String,
    pub items: Vec<Item>,
    pub tags: Vec<Tag>,
}

/// Fetch a store on an existing connection or transaction.
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: i64) -> Result<Store, DbError> {
    sqlx::query_as::<_, Store>("SELECT id, name FROM stores WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("store", id))
}

/// Store repository
pub struct StoreRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StoreRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a store. Names are unique across all stores.
    pub async fn create(&self, name: StoreName) -> Result<Store, DbError> {
        let store = sqlx::query_as::<_, Store>(
            "INSERT INTO stores (name) VALUES (?) RETURNING id, name",
        )
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict("A store with that name already exists.".into())
            } else {
                DbError::Sqlx(e)
            }
        })?;

        tracing::debug!(store_id = store.id, "store created");
        Ok(store)
    }

    pub async fn list(&self) -> Result<Vec<Store>, DbError> {
        let stores = sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(stores)
    }

    pub async fn get(&self, id: i64) -> Result<Store, DbError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Get a store with its items and tags, read in one transaction.
    pub async fn get_detail(&self, id: i64) -> Result<StoreDetail, DbError> {
        let mut tx = self.pool.begin().await?;

        let store = fetch(&mut tx, id).await?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, store_id FROM items WHERE store_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StoreDetail {
            id: store.id,
            name: store.name,
            items,
            tags,
        })
    }

    /// Delete a store together with its items and tags.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("store", id));
        }

        tracing::debug!(store_id = id, "store deleted");
        Ok(())
    }
}
