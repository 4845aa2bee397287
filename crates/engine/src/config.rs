//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional, defaulting to the local gateway layout:
//!
//! - `MERCADITO_AUTH_BASE` - auth service base (default
//!   `http://localhost:8080/auth-service`)
//! - `MERCADITO_CATALOG_BASE` - catalog service base (default
//!   `http://localhost:8080/catalog-service`)
//! - `MERCADITO_CART_BASE` - cart service base (default
//!   `http://localhost:8080/cart-service`)
//! - `MERCADITO_ORDER_BASE` - order service base (default
//!   `http://localhost:8080/order-service`)

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Base URLs for the backend microservices.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Auth service base URL.
    pub auth_base: Url,
    /// Catalog service base URL.
    pub catalog_base: Url,
    /// Cart service base URL.
    pub cart_base: Url,
    /// Order service base URL.
    pub order_base: Url,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any base URL fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_bases(
            &get_env_or_default("MERCADITO_AUTH_BASE", "http://localhost:8080/auth-service"),
            &get_env_or_default(
                "MERCADITO_CATALOG_BASE",
                "http://localhost:8080/catalog-service",
            ),
            &get_env_or_default("MERCADITO_CART_BASE", "http://localhost:8080/cart-service"),
            &get_env_or_default(
                "MERCADITO_ORDER_BASE",
                "http://localhost:8080/order-service",
            ),
        )
    }

    /// Build a configuration from explicit base URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any base URL fails to parse.
    pub fn from_bases(
        auth: &str,
        catalog: &str,
        cart: &str,
        order: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            auth_base: parse_base("MERCADITO_AUTH_BASE", auth)?,
            catalog_base: parse_base("MERCADITO_CATALOG_BASE", catalog)?,
            cart_base: parse_base("MERCADITO_CART_BASE", cart)?,
            order_base: parse_base("MERCADITO_ORDER_BASE", order)?,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL, trimming any trailing slash to avoid `//` in joined
/// paths.
fn parse_base(var: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))
}
