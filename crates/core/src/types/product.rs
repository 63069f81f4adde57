//! Product identifiers and snapshots.
//!
//! A [`ProductId`] is a UUID-v4 in canonical form: lower-case, hyphenated.
//! [`ProductId::parse_canonical`] is the gate that cart restoration runs every
//! persisted line item through; identifiers arriving through live cart
//! mutations come from a validated source and are trusted as-is.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Money;

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is not a UUID at all.
    #[error("product id is not a valid UUID: {0:?}")]
    Malformed(String),
    /// The input is a UUID but not in canonical lower-case hyphenated form
    /// (e.g. braced, URN, simple, or upper-case).
    #[error("product id is not in canonical form: {0:?}")]
    NotCanonical(String),
    /// The input is a canonical UUID but not version 4.
    #[error("product id is not a version-4 UUID: {0:?}")]
    NotVersion4(String),
}

/// A product identifier: a canonical UUID-v4 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generate a fresh random product id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier, accepting only the canonical format.
    ///
    /// The canonical format is the lower-case hyphenated encoding of a
    /// version-4 UUID, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`. Any other
    /// encoding the `uuid` crate would normally accept (braces, URN prefix,
    /// simple form, upper-case hex) is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductIdError`] describing which check failed.
    pub fn parse_canonical(s: &str) -> Result<Self, ProductIdError> {
        let uuid = Uuid::try_parse(s).map_err(|_| ProductIdError::Malformed(s.to_owned()))?;

        // try_parse is permissive; require the round trip to reproduce the
        // input exactly so only the canonical encoding passes.
        let mut buf = [0u8; uuid::fmt::Hyphenated::LENGTH];
        let canonical: &str = uuid.as_hyphenated().encode_lower(&mut buf);
        if canonical != s {
            return Err(ProductIdError::NotCanonical(s.to_owned()));
        }

        if uuid.get_version_num() != 4 {
            return Err(ProductIdError::NotVersion4(s.to_owned()));
        }

        Ok(Self(uuid))
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProductId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_canonical(s)
    }
}

/// Denormalized product data captured when an item is added to the cart.
///
/// The snapshot freezes the price, name and category the shopper saw; later
/// catalog edits do not retroactively change carts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product identifier.
    pub id: ProductId,
    /// Display name at add time.
    pub name: String,
    /// Unit price at add time.
    pub price: Money,
    /// Optional category label, forwarded to coupon validation.
    pub category: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_accepts_v4() {
        let id = ProductId::new();
        let parsed = ProductId::parse_canonical(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = ProductId::parse_canonical("not-a-uuid").unwrap_err();
        assert!(matches!(err, ProductIdError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_upper_case() {
        let upper = ProductId::new().to_string().to_uppercase();
        let err = ProductId::parse_canonical(&upper).unwrap_err();
        assert!(matches!(err, ProductIdError::NotCanonical(_)));
    }

    #[test]
    fn test_parse_rejects_simple_form() {
        let simple = ProductId::new().as_uuid().simple().to_string();
        let err = ProductId::parse_canonical(&simple).unwrap_err();
        assert!(matches!(err, ProductIdError::NotCanonical(_)));
    }

    #[test]
    fn test_parse_rejects_braced_form() {
        let braced = ProductId::new().as_uuid().braced().to_string();
        let err = ProductId::parse_canonical(&braced).unwrap_err();
        assert!(matches!(err, ProductIdError::NotCanonical(_)));
    }

    #[test]
    fn test_parse_rejects_non_v4() {
        // Nil UUID is canonical but version 0.
        let err = ProductId::parse_canonical("00000000-0000-0000-0000-000000000000").unwrap_err();
        assert!(matches!(err, ProductIdError::NotVersion4(_)));
    }

    #[test]
    fn test_display_is_canonical() {
        let id = ProductId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s, s.to_lowercase());
        assert!(ProductId::parse_canonical(&s).is_ok());
    }
}
