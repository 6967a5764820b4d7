//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the authorization code flow. It
//! generates a state nonce for CSRF protection and the URL of Shopify's
//! consent screen for an offline (permanent) access token.
//!
//! # Example
//!
//! ```rust
//! use token_relay::{ShopifyConfig, ApiKey, ApiSecretKey, ShopDomain, HostName};
//! use token_relay::auth::oauth::begin_auth;
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .host_name(HostName::new("myapp.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("test-shop").unwrap();
//! let result = begin_auth(&config, &shop, "/api/auth/callback").unwrap();
//! assert!(result.auth_url.starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
//! ```

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateParam;
use crate::config::{ShopDomain, ShopifyConfig};

/// Result of initiating OAuth authorization.
///
/// The `state` value must be kept by the caller and compared against the
/// callback's `state` parameter.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The state parameter generated for this authorization request.
    pub state: StateParam,
}

/// Initiates the OAuth authorization code flow for an offline token.
///
/// # Arguments
///
/// * `config` - Validated configuration (must have a host name)
/// * `shop` - The shop to authorize against
/// * `redirect_path` - Path on this app that receives the callback
///
/// # Errors
///
/// Returns [`OAuthError::MissingHostConfig`] if no host name is configured.
pub fn begin_auth(
    config: &ShopifyConfig,
    shop: &ShopDomain,
    redirect_path: &str,
) -> Result<BeginAuthResult, OAuthError> {
    let redirect_uri = config
        .redirect_uri(redirect_path)
        .ok_or(OAuthError::MissingHostConfig)?;

    let state = StateParam::new();

    // Offline access: no grant_options[]=per-user
    let params = [
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", config.scopes().to_string()),
        ("redirect_uri", redirect_uri),
        ("state", state.to_string()),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    Ok(BeginAuthResult { auth_url, state })
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};
