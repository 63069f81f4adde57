//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! carries only the cart key; cart state itself lives in the cart records
//! table.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cw_session";

/// Session expiry time in seconds (30 days - carts should outlive a visit).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer from a prepared `PostgreSQL` store.
///
/// The caller is responsible for running `store.migrate()` before serving.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
