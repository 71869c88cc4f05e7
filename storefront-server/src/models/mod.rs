//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod credentials;
pub mod name;
pub mod price;
pub mod validation;

pub use credentials::{Email, Password, Username};
pub use name::{ItemName, StoreName, TagName};
pub use price::Price;
pub use validation::ValidationError;
