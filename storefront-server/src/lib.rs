//! storefront-server: REST API for stores, items, and tags
//!
//! Tags belong to one store and can be linked to that store's items.
//! Every resource route sits behind a JWT bearer token; revoked tokens are
//! tracked in the database.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

pub use auth::{JwtConfig, PasswordHasher};
pub use http::{build_router, run_server, AppState, ServerConfig};
