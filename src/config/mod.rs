//! Configuration types for the token relay.
//!
//! # Overview
//!
//! - [`EnvConfig`]: everything read from the process environment, with the
//!   API credentials still optional
//! - [`ShopifyConfig`]: the validated configuration the OAuth flow runs on,
//!   built from an [`EnvConfig`] only when authorization is attempted
//! - Validated newtypes: [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostName`]
//! - [`ApiVersion`]: the Shopify API version
//!
//! # Example
//!
//! ```rust
//! use token_relay::{ShopifyConfig, ApiKey, ApiSecretKey, HostName};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host_name(HostName::new("myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri("/api/auth/callback").unwrap(),
//!     "https://myapp.example.com/api/auth/callback");
//! ```

pub mod env;
mod newtypes;
mod version;

pub use env::{normalize_host, resolve_host, EnvConfig};
pub use newtypes::{ApiKey, ApiSecretKey, HostName, ShopDomain};
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Validated configuration for the OAuth flow.
///
/// # Key Rotation
///
/// When validating HMAC signatures the primary secret is tried first, then
/// `old_api_secret_key` if configured, so in-flight flows survive a rotation.
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    host_name: Option<HostName>,
    host_scheme: String,
    api_version: ApiVersion,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the OAuth scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the public host name, if configured.
    #[must_use]
    pub const fn host_name(&self) -> Option<&HostName> {
        self.host_name.as_ref()
    }

    /// Returns the scheme used for redirect URIs.
    #[must_use]
    pub fn host_scheme(&self) -> &str {
        &self.host_scheme
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Builds the absolute redirect URI for `path`, or `None` without a host.
    #[must_use]
    pub fn redirect_uri(&self, path: &str) -> Option<String> {
        self.host_name
            .as_ref()
            .map(|host| format!("{}://{}{}", self.host_scheme, host, path))
    }

    /// Returns the secrets to try when verifying a signature, primary first.
    pub(crate) fn signing_secrets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.api_secret_key.as_ref())
            .chain(self.old_api_secret_key.as_ref().map(AsRef::as_ref))
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for constructing [`ShopifyConfig`] instances.
///
/// Required fields are `api_key` and `api_secret_key`.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::pinned`]
/// - `scopes`: Empty
/// - `host_name`: `None`
/// - `host_scheme`: `https`
/// - `old_api_secret_key`: `None`
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host_name: Option<HostName>,
    host_scheme: Option<String>,
    api_version: Option<ApiVersion>,
}

impl ShopifyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the old API secret key for key rotation support.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the public host name.
    #[must_use]
    pub fn host_name(mut self, host: HostName) -> Self {
        self.host_name = Some(host);
        self
    }

    /// Sets the redirect URI scheme.
    #[must_use]
    pub fn host_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.host_scheme = Some(scheme.into());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Builds the [`ShopifyConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` are not set.
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        Ok(ShopifyConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes.unwrap_or_default(),
            host_name: self.host_name,
            host_scheme: self.host_scheme.unwrap_or_else(|| "https".to_string()),
            api_version: self.api_version.unwrap_or_default(),
        })
    }
}
