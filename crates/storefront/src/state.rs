//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::checkout::{CheckoutClient, CheckoutError};
use crate::services::coupon::{CouponClient, CouponError};

/// Error building the shared application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("coupon client: {0}")]
    Coupon(#[from] CouponError),
    #[error("checkout client: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    coupons: CouponClient,
    checkout: CheckoutClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let coupons = CouponClient::new(&config.coupon)?;
        let checkout = CheckoutClient::new(&config.checkout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                coupons,
                checkout,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the coupon validation client.
    #[must_use]
    pub fn coupons(&self) -> &CouponClient {
        &self.inner.coupons
    }

    /// Get a reference to the checkout session client.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutClient {
        &self.inner.checkout
    }
}
