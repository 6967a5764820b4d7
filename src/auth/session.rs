//! Offline sessions issued by the OAuth callback.
//!
//! A [`Session`] binds a shop to the permanent access token Shopify issued for
//! it. The relay never mutates a session; it is created on a successful
//! callback, read by the root route and dropped on uninstall.

use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use serde::Deserialize;
use std::fmt;

/// A permanent (offline) Shopify access token.
///
/// `Debug` never prints the value. Use [`AccessToken::redacted`] for logs and
/// [`AccessToken::expose`] only where the token is meant to be shown.
///
/// ```rust
/// use token_relay::AccessToken;
///
/// let token = AccessToken::new("shpat_0123456789abcdef");
/// assert_eq!(format!("{token:?}"), "AccessToken(shpat_***)");
/// assert_eq!(token.expose(), "shpat_0123456789abcdef");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    const VISIBLE_PREFIX: usize = 6;

    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a log-safe rendering: the token's first six characters followed
    /// by `***`, or just `***` for tokens too short to keep a prefix.
    #[must_use]
    pub fn redacted(&self) -> String {
        if self.0.chars().count() <= Self::VISIBLE_PREFIX * 2 {
            return "***".to_string();
        }
        let prefix: String = self.0.chars().take(Self::VISIBLE_PREFIX).collect();
        format!("{prefix}***")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.redacted())
    }
}

/// An offline session for one shop.
///
/// # Example
///
/// ```rust
/// use token_relay::{AccessToken, Session, ShopDomain};
///
/// let session = Session::new(
///     ShopDomain::new("my-store").unwrap(),
///     AccessToken::new("tok_123"),
///     "read_products".parse().unwrap(),
/// );
///
/// assert_eq!(session.id, "offline_my-store.myshopify.com");
/// assert!(session.is_active());
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    /// Unique identifier for this session, `offline_<shop>`.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The permanent access token.
    pub access_token: AccessToken,

    /// The OAuth scopes granted to this session.
    pub scopes: AuthScopes,
}

impl Session {
    /// Creates a new offline session.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: AccessToken, scopes: AuthScopes) -> Self {
        Self {
            id: Self::generate_offline_id(&shop),
            shop,
            access_token,
            scopes,
        }
    }

    /// Returns the session id used for a shop's offline session.
    #[must_use]
    pub fn generate_offline_id(shop: &ShopDomain) -> String {
        format!("offline_{}", shop.as_ref())
    }

    /// Returns `true` if this session carries a token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub(crate) fn from_access_token_response(
        shop: ShopDomain,
        response: &AccessTokenResponse,
    ) -> Self {
        // Shopify reports granted scopes; an unparseable list is not worth failing the handshake over
        let scopes = response.scope.parse().unwrap_or_default();
        Self::new(shop, AccessToken::new(response.access_token.clone()), scopes)
    }
}

/// Body of Shopify's `/admin/oauth/access_token` response for offline tokens.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopDomain {
        ShopDomain::new("shop").unwrap()
    }

    #[test]
    fn test_session_is_active() {
        let active = Session::new(shop(), AccessToken::new("token"), AuthScopes::new());
        assert!(active.is_active());

        let no_token = Session::new(shop(), AccessToken::new(""), AuthScopes::new());
        assert!(!no_token.is_active());
    }

    #[test]
    fn test_debug_output_never_contains_token() {
        let session = Session::new(
            shop(),
            AccessToken::new("shpat_supersecretvalue"),
            AuthScopes::new(),
        );
        let debug = format!("{session:?}");
        assert!(!debug.contains("supersecretvalue"));
        assert!(debug.contains("shpat_***"));
    }

    #[test]
    fn test_short_tokens_are_fully_redacted() {
        assert_eq!(AccessToken::new("tok_123").redacted(), "***");
        assert_eq!(AccessToken::new("").redacted(), "***");
    }

    #[test]
    fn test_from_access_token_response() {
        let response: AccessTokenResponse = serde_json::from_str(
            r#"{"access_token": "shpat_abc", "scope": "write_orders"}"#,
        )
        .unwrap();
        let session = Session::from_access_token_response(shop(), &response);

        assert_eq!(session.id, "offline_shop.myshopify.com");
        assert_eq!(session.access_token.expose(), "shpat_abc");
        assert!(session.scopes.iter().any(|s| s == "read_orders"));
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}
