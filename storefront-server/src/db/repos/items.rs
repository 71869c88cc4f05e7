//! Item repository
//!
//! Items always belong to exactly one store. `upsert` follows PUT semantics:
//! update in place when the id exists, otherwise create with that id.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::error::DbError;
use super::stores;
use super::tags::{self, Tag};
use crate::models::{ItemName, Price, ValidationError};

/// Item record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub store_id: i64,
}

/// Item with the tags linked to it
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub store_id: i64,
    pub tags: Vec<Tag>,
}

/// Validated input for a new item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: ItemName,
    pub price: Price,
    pub store_id: i64,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<ItemName>,
    pub price: Option<Price>,
    pub store_id: Option<i64>,
}

/// Fetch an item on an existing connection or transaction.
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: i64) -> Result<Item, DbError> {
    find(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("item", id))
}

async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Item>, DbError> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT id, name, price, store_id FROM items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(item)
}

async fn insert(
    conn: &mut SqliteConnection,
    id: Option<i64>,
    item: &NewItem,
) -> Result<Item, DbError> {
    // Surface a missing store as 404 rather than a foreign key failure
    stores::fetch(conn, item.store_id).await?;

    let created = sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (id, name, price, store_id)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, price, store_id
        "#,
    )
    .bind(id)
    .bind(item.name.as_str())
    .bind(item.price.value())
    .bind(item.store_id)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(item_id = created.id, store_id = created.store_id, "item created");
    Ok(created)
}

/// Item repository
pub struct ItemRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ItemRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an item in an existing store.
    pub async fn create(&self, item: NewItem) -> Result<Item, DbError> {
        let mut tx = self.pool.begin().await?;
        let created = insert(&mut tx, None, &item).await?;
        tx.commit().await?;
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Item>, DbError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, store_id FROM items ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<Item, DbError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Get an item with its tags, read in one transaction.
    pub async fn get_detail(&self, id: i64) -> Result<ItemDetail, DbError> {
        let mut tx = self.pool.begin().await?;
        let item = fetch(&mut tx, id).await?;
        let tags = tags::for_item(&mut tx, id).await?;
        tx.commit().await?;

        Ok(ItemDetail {
            id: item.id,
            name: item.name,
            price: item.price,
            store_id: item.store_id,
            tags,
        })
    }

    /// Update an existing item or create one with the given id.
    ///
    /// An existing item keeps its store: moving it would orphan its tag
    /// links across stores. Creating requires name, price and store_id.
    pub async fn upsert(&self, id: i64, changes: ItemChanges) -> Result<Item, DbError> {
        let mut tx = self.pool.begin().await?;

        let item = match find(&mut tx, id).await? {
            Some(_) => {
                let updated = sqlx::query_as::<_, Item>(
                    r#"
                    UPDATE items
                    SET name = COALESCE(?, name), price = COALESCE(?, price)
                    WHERE id = ?
                    RETURNING id, name, price, store_id
                    "#,
                )
                .bind(changes.name.as_ref().map(ItemName::as_str))
                .bind(changes.price.map(Price::value))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                tracing::debug!(item_id = id, "item updated");
                updated
            }
            None => {
                let new_item = NewItem {
                    name: changes.name.ok_or(ValidationError::Missing { field: "name" })?,
                    price: changes.price.ok_or(ValidationError::Missing { field: "price" })?,
                    store_id: changes
                        .store_id
                        .ok_or(ValidationError::Missing { field: "store_id" })?,
                };
                insert(&mut tx, Some(id), &new_item).await?
            }
        };

        tx.commit().await?;
        Ok(item)
    }

    /// Delete an item; its tag links go with it.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("item", id));
        }

        tracing::debug!(item_id = id, "item deleted");
        Ok(())
    }
}
