//! Database operations for storefront `PostgreSQL`.
//!
//! # Tables
//!
//! - `storefront.cart_record` - Persisted cart state (JSONB) keyed by cart key
//! - `session` - Tower-sessions storage (managed by the session store)
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded via
//! `sqlx::migrate!`; the binary runs them on startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod carts;

pub use carts::CartRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored record could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A record could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
