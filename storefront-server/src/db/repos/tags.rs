//! Tag repository and association rules
//!
//! Invariants enforced here:
//! - tag names are unique per store (UNIQUE (store_id, name) backs the check)
//! - an item may only carry tags from its own store
//! - a tag linked to any item cannot be deleted
//!
//! Every mutation runs in one transaction. Rule violations return before
//! the first write, and dropping the transaction rolls it back.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::error::{is_unique_violation, DbError};
use super::items::{self, Item};
use super::stores;
use crate::models::TagName;

const DUPLICATE_TAG: &str = "A tag with that name already exists in that store.";
const CROSS_STORE_LINK: &str = "Item and tag must belong to the same store.";
const TAG_IN_USE: &str = "Could not delete this tag. Please make sure tag is not connected with any items, then attempt again.";

/// Tag record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub store_id: i64,
}

/// Fetch a tag on an existing connection or transaction.
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: i64) -> Result<Tag, DbError> {
    sqlx::query_as::<_, Tag>("SELECT id, name, store_id FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("tag", id))
}

/// Tags linked to an item, by tag id.
pub(crate) async fn for_item(conn: &mut SqliteConnection, item_id: i64) -> Result<Vec<Tag>, DbError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.store_id
        FROM tags t
        JOIN items_tags it ON it.tag_id = t.id
        WHERE it.item_id = ?
        ORDER BY t.id
        "#,
    )
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the tags of a store in id order.
    pub async fn list_for_store(&self, store_id: i64) -> Result<Vec<Tag>, DbError> {
        let mut tx = self.pool.begin().await?;
        stores::fetch(&mut tx, store_id).await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ? ORDER BY id",
        )
        .bind(store_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(tags)
    }

    pub async fn get(&self, id: i64) -> Result<Tag, DbError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Create a tag scoped to a store.
    pub async fn create(&self, store_id: i64, name: TagName) -> Result<Tag, DbError> {
        let mut tx = self.pool.begin().await?;

        stores::fetch(&mut tx, store_id).await?;

        let (taken,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tags WHERE store_id = ? AND name = ?",
        )
        .bind(store_id)
        .bind(name.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if taken > 0 {
            return Err(DbError::Conflict(DUPLICATE_TAG.into()));
        }

        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, store_id) VALUES (?, ?) RETURNING id, name, store_id",
        )
        .bind(name.as_str())
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent insert of the same name
            if is_unique_violation(&e) {
                DbError::Conflict(DUPLICATE_TAG.into())
            } else {
                DbError::Sqlx(e)
            }
        })?;

        tx.commit().await?;

        tracing::debug!(tag_id = tag.id, store_id, "tag created");
        Ok(tag)
    }

    /// Confirm that a tag belongs to a store.
    ///
    /// A tag is owned by exactly one store, so this never writes. A tag
    /// from another store is rejected instead of being moved.
    pub async fn link_to_store(&self, store_id: i64, tag_id: i64) -> Result<Tag, DbError> {
        let mut tx = self.pool.begin().await?;

        stores::fetch(&mut tx, store_id).await?;
        let tag = fetch(&mut tx, tag_id).await?;

        if tag.store_id != store_id {
            return Err(DbError::InvalidArgument(
                "Tag belongs to a different store.".into(),
            ));
        }

        tx.commit().await?;
        Ok(tag)
    }

    /// Link a tag to an item of the same store. Re-linking is a no-op.
    pub async fn link_to_item(&self, item_id: i64, tag_id: i64) -> Result<Tag, DbError> {
        let mut tx = self.pool.begin().await?;

        let item = items::fetch(&mut tx, item_id).await?;
        let tag = fetch(&mut tx, tag_id).await?;

        if item.store_id != tag.store_id {
            return Err(DbError::InvalidArgument(CROSS_STORE_LINK.into()));
        }

        sqlx::query(
            "INSERT INTO items_tags (item_id, tag_id) VALUES (?, ?) ON CONFLICT (item_id, tag_id) DO NOTHING",
        )
        .bind(item_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(item_id, tag_id, "tag linked to item");
        Ok(tag)
    }

    /// Remove the link between an item and a tag.
    ///
    /// Unlinking a pair that is not linked is NotFound and writes nothing.
    pub async fn unlink_from_item(&self, item_id: i64, tag_id: i64) -> Result<(Item, Tag), DbError> {
        let mut tx = self.pool.begin().await?;

        let item = items::fetch(&mut tx, item_id).await?;
        let tag = fetch(&mut tx, tag_id).await?;

        let result = sqlx::query("DELETE FROM items_tags WHERE item_id = ? AND tag_id = ?")
            .bind(item_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("item tag link", format!("{item_id}/{tag_id}")));
        }

        tx.commit().await?;

        tracing::debug!(item_id, tag_id, "tag unlinked from item");
        Ok((item, tag))
    }

    /// Delete a tag that no item uses.
    pub async fn delete(&self, tag_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        fetch(&mut tx, tag_id).await?;

        let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items_tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_one(&mut *tx)
            .await?;

        if links > 0 {
            return Err(DbError::Conflict(TAG_IN_USE.into()));
        }

        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(tag_id, "tag deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::db::repos::{ItemRepo, NewItem, StoreRepo};
    use crate::models::{ItemName, Price, StoreName};

    struct Fixture {
        pool: SqlitePool,
        store_a: i64,
        store_b: i64,
        item_a: i64,
        item_b: i64,
    }

    async fn fixture() -> Fixture {
        let pool = create_memory_pool().await.unwrap();
        let stores = StoreRepo::new(&pool);
        let store_a = stores.create(StoreName::new("A").unwrap()).await.unwrap().id;
        let store_b = stores.create(StoreName::new("B").unwrap()).await.unwrap().id;

        let items = ItemRepo::new(&pool);
        let new_item = |store_id| NewItem {
            name: ItemName::new("Chair").unwrap(),
            price: Price::new(1.0).unwrap(),
            store_id,
        };
        let item_a = items.create(new_item(store_a)).await.unwrap().id;
        let item_b = items.create(new_item(store_b)).await.unwrap().id;

        Fixture {
            pool,
            store_a,
            store_b,
            item_a,
            item_b,
        }
    }

    fn name(s: &str) -> TagName {
        TagName::new(s).unwrap()
    }

    async fn link_count(pool: &SqlitePool) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items_tags")
            .fetch_one(pool)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn create_then_duplicate_conflicts() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);

        let tag = repo.create(f.store_a, name("sale")).await.unwrap();
        assert_eq!(tag.name, "sale");
        assert_eq!(tag.store_id, f.store_a);

        let err = repo.create(f.store_a, name("sale")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref m) if m == DUPLICATE_TAG));
    }

    #[tokio::test]
    async fn same_name_allowed_in_other_store() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);

        repo.create(f.store_a, name("sale")).await.unwrap();
        repo.create(f.store_b, name("sale")).await.unwrap();

        assert_eq!(repo.list_for_store(f.store_a).await.unwrap().len(), 1);
        assert_eq!(repo.list_for_store(f.store_b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_in_missing_store_is_not_found() {
        let f = fixture().await;
        let err = TagRepo::new(&f.pool).create(99, name("sale")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "store", .. }));
    }

    #[tokio::test]
    async fn list_for_missing_store_is_not_found() {
        let f = fixture().await;
        let err = TagRepo::new(&f.pool).list_for_store(99).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "store", .. }));
    }

    #[tokio::test]
    async fn link_requires_same_store() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        let err = repo.link_to_item(f.item_b, tag.id).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(ref m) if m == CROSS_STORE_LINK));
        assert_eq!(link_count(&f.pool).await, 0);

        let linked = repo.link_to_item(f.item_a, tag.id).await.unwrap();
        assert_eq!(linked, tag);
        assert_eq!(link_count(&f.pool).await, 1);
    }

    #[tokio::test]
    async fn relinking_does_not_duplicate() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        repo.link_to_item(f.item_a, tag.id).await.unwrap();
        repo.link_to_item(f.item_a, tag.id).await.unwrap();

        assert_eq!(link_count(&f.pool).await, 1);
    }

    #[tokio::test]
    async fn link_then_unlink_restores_state() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        repo.link_to_item(f.item_a, tag.id).await.unwrap();
        let (item, unlinked) = repo.unlink_from_item(f.item_a, tag.id).await.unwrap();

        assert_eq!(item.id, f.item_a);
        assert_eq!(unlinked, tag);
        assert_eq!(link_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn unlink_without_link_is_not_found() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        let err = repo.unlink_from_item(f.item_a, tag.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "item tag link", .. }));
    }

    #[tokio::test]
    async fn link_to_store_confirms_owner_only() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        assert_eq!(repo.link_to_store(f.store_a, tag.id).await.unwrap(), tag);

        let err = repo.link_to_store(f.store_b, tag.id).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));
        assert_eq!(repo.get(tag.id).await.unwrap().store_id, f.store_a);

        let err = repo.link_to_store(f.store_a, 99).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "tag", .. }));
    }

    #[tokio::test]
    async fn delete_blocked_while_linked() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();
        repo.link_to_item(f.item_a, tag.id).await.unwrap();

        let err = repo.delete(tag.id).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref m) if m == TAG_IN_USE));
        assert_eq!(repo.get(tag.id).await.unwrap(), tag);

        repo.unlink_from_item(f.item_a, tag.id).await.unwrap();
        repo.delete(tag.id).await.unwrap();

        let err = repo.get(tag.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "tag", .. }));
    }

    #[tokio::test]
    async fn deleting_tag_keeps_items() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let tag = repo.create(f.store_a, name("sale")).await.unwrap();

        repo.delete(tag.id).await.unwrap();

        assert!(ItemRepo::new(&f.pool).get(f.item_a).await.is_ok());
    }

    #[tokio::test]
    async fn item_detail_lists_linked_tags() {
        let f = fixture().await;
        let repo = TagRepo::new(&f.pool);
        let sale = repo.create(f.store_a, name("sale")).await.unwrap();
        repo.create(f.store_a, name("new")).await.unwrap();
        repo.link_to_item(f.item_a, sale.id).await.unwrap();

        let detail = ItemRepo::new(&f.pool).get_detail(f.item_a).await.unwrap();
        assert_eq!(detail.tags, vec![sale]);
    }
}
