//! OAuth-specific error types.
//!
//! # Error Types
//!
//! - [`OAuthError::InvalidHmac`]: HMAC signature validation failed
//! - [`OAuthError::StateMismatch`]: OAuth state parameter doesn't match expected
//! - [`OAuthError::NoPendingAuthorization`]: callback without a live `begin`
//! - [`OAuthError::TokenExchangeFailed`]: Token exchange request failed
//! - [`OAuthError::InvalidCallback`]: Callback parameters are malformed
//! - [`OAuthError::MissingHostConfig`]: Host name not configured for redirect URI
//! - [`OAuthError::Config`]: API credentials missing or invalid
//!
//! # Example
//!
//! ```rust
//! use token_relay::auth::oauth::OAuthError;
//!
//! let error = OAuthError::InvalidHmac;
//! assert_eq!(error.to_string(), "HMAC signature validation failed");
//! ```

use crate::error::ConfigError;
use thiserror::Error;

/// Errors that can occur during the OAuth authorization code flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// HMAC signature validation failed.
    ///
    /// The callback's `hmac` does not match the signature computed with the
    /// API secret key (or the old key during rotation).
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// OAuth state parameter mismatch.
    ///
    /// The values are kept for diagnostics and never appear in the message,
    /// which is shown to the browser.
    #[error("State parameter mismatch")]
    StateMismatch {
        /// The expected state value that was generated.
        expected: String,
        /// The state value received in the callback.
        received: String,
    },

    /// No authorization was started for this shop, or it has expired.
    #[error("No authorization in progress for shop '{shop}'. Start again at /api/auth?shop={shop}")]
    NoPendingAuthorization {
        /// The shop named in the callback.
        shop: String,
    },

    /// Token exchange request failed.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned, `0` for network failures.
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// Callback parameters are invalid or malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// Description of what's invalid about the callback.
        reason: String,
    },

    /// No public host name is configured, so no redirect URI can be built.
    #[error("Host name must be configured (HOST or SHOPIFY_APP_URL) for OAuth")]
    MissingHostConfig,

    /// The app configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
