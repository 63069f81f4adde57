//! Cart record repository.
//!
//! The explicit load/save adapter for persisted carts. Handlers call `load`
//! before mutating and fire `save` after the mutation has completed; nothing
//! in the cart engine touches the database directly.

use sqlx::PgPool;

use crate::cart::persistence::{PersistedCart, PersistedState};

use super::RepositoryError;

/// Repository for persisted cart records.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the persisted cart for `cart_key`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if the stored state cannot be
    /// decoded.
    pub async fn load(&self, cart_key: &str) -> Result<Option<PersistedCart>, RepositoryError> {
        let row: Option<(serde_json::Value, i32)> = sqlx::query_as(
            r"
            SELECT state, version
            FROM storefront.cart_record
            WHERE cart_key = $1
            ",
        )
        .bind(cart_key)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((state, version)) => {
                let state: PersistedState = serde_json::from_value(state).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid cart state for key {cart_key}: {e}"
                    ))
                })?;
                Ok(Some(PersistedCart { state, version }))
            }
            None => Ok(None),
        }
    }

    /// Upsert the persisted cart for `cart_key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the record cannot be
    /// encoded and `RepositoryError::Database` if the upsert fails.
    pub async fn save(
        &self,
        cart_key: &str,
        record: &PersistedCart,
    ) -> Result<(), RepositoryError> {
        let state = serde_json::to_value(&record.state)?;

        sqlx::query(
            r"
            INSERT INTO storefront.cart_record (cart_key, state, version, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (cart_key)
            DO UPDATE SET state = EXCLUDED.state,
                          version = EXCLUDED.version,
                          updated_at = now()
            ",
        )
        .bind(cart_key)
        .bind(state)
        .bind(record.version)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the persisted cart for `cart_key`. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, cart_key: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM storefront.cart_record
            WHERE cart_key = $1
            ",
        )
        .bind(cart_key)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
