//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - get-by-id returns `DbError::NotFound` instead of `Option`
//! - unique constraints back every duplicate check
//! - transactions for multi-step operations

pub mod blocklist;
pub mod error;
pub mod items;
pub mod stores;
pub mod tags;
pub mod users;

pub use blocklist::BlocklistRepo;
pub use error::DbError;
pub use items::{Item, ItemChanges, ItemDetail, ItemRepo, NewItem};
pub use stores::{Store, StoreDetail, StoreRepo};
pub use tags::{Tag, TagRepo};
pub use users::{User, UserCredentials, UserRepo};
