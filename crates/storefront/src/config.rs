//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `COUPON_SERVICE_URL` - Base URL of the coupon validation service
//! - `COUPON_SERVICE_TOKEN` - Bearer token for the coupon validation service
//! - `CHECKOUT_SERVICE_URL` - Base URL of the payment processor's checkout API
//! - `CHECKOUT_SERVICE_TOKEN` - Secret key for the checkout API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Coupon validation service configuration
    pub coupon: CouponServiceConfig,
    /// Payment processor checkout API configuration
    pub checkout: CheckoutServiceConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Coupon validation service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CouponServiceConfig {
    /// Base URL of the coupon validation endpoint
    pub base_url: String,
    /// Bearer token for the validation API
    pub token: SecretString,
}

impl std::fmt::Debug for CouponServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponServiceConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Payment processor checkout API configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct CheckoutServiceConfig {
    /// Base URL of the checkout session API
    pub base_url: String,
    /// Secret API key for creating checkout sessions
    pub token: SecretString,
}

impl std::fmt::Debug for CheckoutServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutServiceConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let coupon = CouponServiceConfig::from_env()?;
        let checkout = CheckoutServiceConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            coupon,
            checkout,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CouponServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_service_url("COUPON_SERVICE_URL")?,
            token: get_validated_secret("COUPON_SERVICE_TOKEN")?,
        })
    }
}

impl CheckoutServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_service_url("CHECKOUT_SERVICE_URL")?,
            token: get_validated_secret("CHECKOUT_SERVICE_TOKEN")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable that must parse as an absolute URL.
///
/// A trailing slash is trimmed so callers can join paths with plain
/// `format!` concatenation.
fn get_service_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., STOREFRONT_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
