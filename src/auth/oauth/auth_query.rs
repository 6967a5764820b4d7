//! Query parameters of the OAuth callback.

use std::collections::BTreeMap;

/// The query string Shopify sends to the callback endpoint.
///
/// Every parameter except `hmac` takes part in the signature, so unknown
/// parameters are kept rather than dropped.
///
/// # Example
///
/// ```rust
/// use token_relay::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::from_params([
///     ("shop".to_string(), "my-store.myshopify.com".to_string()),
///     ("code".to_string(), "abc".to_string()),
///     ("hmac".to_string(), "deadbeef".to_string()),
/// ]);
///
/// assert_eq!(query.shop(), "my-store.myshopify.com");
/// assert_eq!(query.hmac, "deadbeef");
/// assert_eq!(query.to_signable_string(), "code=abc&shop=my-store.myshopify.com");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthQuery {
    params: BTreeMap<String, String>,
    /// The signature Shopify attached to the callback.
    pub hmac: String,
}

impl AuthQuery {
    /// Builds a query from the standard callback parameters.
    #[must_use]
    pub fn new(
        code: String,
        shop: String,
        timestamp: String,
        state: String,
        host: String,
        hmac: String,
    ) -> Self {
        let params = BTreeMap::from([
            ("code".to_string(), code),
            ("host".to_string(), host),
            ("shop".to_string(), shop),
            ("state".to_string(), state),
            ("timestamp".to_string(), timestamp),
        ]);

        Self { params, hmac }
    }

    /// Builds a query from raw key/value pairs, splitting off `hmac`.
    ///
    /// The legacy `signature` parameter is never part of the signed message
    /// and is dropped.
    #[must_use]
    pub fn from_params(params: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut hmac = String::new();
        let mut signed = BTreeMap::new();

        for (key, value) in params {
            match key.as_str() {
                "hmac" => hmac = value,
                "signature" => {}
                _ => {
                    signed.insert(key, value);
                }
            }
        }

        Self {
            params: signed,
            hmac,
        }
    }

    /// Returns a parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the authorization code, or `""` if absent.
    #[must_use]
    pub fn code(&self) -> &str {
        self.get("code").unwrap_or_default()
    }

    /// Returns the shop domain, or `""` if absent.
    #[must_use]
    pub fn shop(&self) -> &str {
        self.get("shop").unwrap_or_default()
    }

    /// Returns the state parameter, or `""` if absent.
    #[must_use]
    pub fn state(&self) -> &str {
        self.get("state").unwrap_or_default()
    }

    /// Returns the timestamp, or `""` if absent.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        self.get("timestamp").unwrap_or_default()
    }

    /// Returns the message Shopify signed: every parameter except `hmac`,
    /// sorted by key, joined as `key=value` pairs with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
