//! Display-name validation for stores, items, and tags
//!
//! All three share the same rules: trimmed, non-empty, at most 80 characters.

use super::ValidationError;

/// Maximum length for store, item, and tag names
pub const MAX_NAME_LEN: usize = 80;

fn validate(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }

    Ok(trimmed.to_owned())
}

macro_rules! validated_name {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: &str) -> Result<Self, ValidationError> {
                validate($field, s).map(Self)
            }

            /// Get the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

validated_name!(
    /// Validated store name (unique across all stores)
    StoreName,
    "store name"
);

validated_name!(
    /// Validated item name
    ItemName,
    "item name"
);

validated_name!(
    /// Validated tag name (unique within its store)
    ///
    /// # Example
    /// ```
    /// use storefront_server::models::TagName;
    ///
    /// assert_eq!(TagName::new("  sale ").unwrap().as_str(), "sale");
    /// assert!(TagName::new("   ").is_err());
    /// ```
    TagName,
    "tag name"
);
