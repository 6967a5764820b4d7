//! Configuration error types for the token relay.
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable
//! for an operator reading the process log or a 500 page.
//!
//! # Example
//!
//! ```rust
//! use token_relay::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please set SHOPIFY_API_KEY to a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please set SHOPIFY_API_SECRET to a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-10') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This value must be configured before authorization can start.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host name is invalid.
    #[error("Invalid host name '{host}'. Expected a bare host such as 'myapp.example.com'.")]
    InvalidHostName {
        /// The invalid host that was provided.
        host: String,
    },

    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value for environment variable {name}: {reason}")]
    InvalidEnvVar {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
