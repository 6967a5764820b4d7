//! Webhook signature verification.
//!
//! Shopify signs each webhook body with HMAC-SHA256 under the app's API
//! secret and sends the base64 digest in `X-Shopify-Hmac-SHA256`.
//!
//! # Example
//!
//! ```rust
//! use token_relay::webhooks::{verify_webhook, WebhookRequest};
//! use token_relay::{ApiKey, ApiSecretKey, ShopifyConfig};
//! use token_relay::auth::oauth::hmac::compute_signature_base64;
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let body = br#"{"id":1}"#;
//! let request = WebhookRequest::new(
//!     body.to_vec(),
//!     compute_signature_base64(body, "secret"),
//!     Some("app/uninstalled".to_string()),
//!     Some("my-store.myshopify.com".to_string()),
//!     None,
//!     None,
//! );
//!
//! let context = verify_webhook(&config, &request).unwrap();
//! assert!(context.is_app_uninstalled());
//! assert_eq!(context.shop_domain(), Some("my-store.myshopify.com"));
//! ```

use crate::auth::oauth::hmac::{compute_signature_base64, constant_time_compare};
use crate::config::ShopifyConfig;
use crate::webhooks::WebhookError;

/// Base64 HMAC-SHA256 of the raw body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// Topic string, e.g. `app/uninstalled`.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// The `*.myshopify.com` domain the event belongs to.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// API version of the payload.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// Unique delivery id.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// Topic Shopify sends when a merchant removes the app.
pub const TOPIC_APP_UNINSTALLED: &str = "app/uninstalled";

/// An incoming webhook: raw body plus the Shopify headers.
///
/// The body is kept as bytes; re-serializing it would break the signature.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    body: Vec<u8>,
    hmac_header: String,
    topic: Option<String>,
    shop_domain: Option<String>,
    api_version: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookRequest {
    /// Creates a webhook request from the body and header values.
    #[must_use]
    pub fn new(
        body: Vec<u8>,
        hmac_header: String,
        topic: Option<String>,
        shop_domain: Option<String>,
        api_version: Option<String>,
        webhook_id: Option<String>,
    ) -> Self {
        Self {
            body,
            hmac_header,
            topic,
            shop_domain,
            api_version,
            webhook_id,
        }
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the signature header value (empty if absent).
    #[must_use]
    pub fn hmac_header(&self) -> &str {
        &self.hmac_header
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

/// Metadata of a webhook whose signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookContext {
    topic_raw: String,
    shop_domain: Option<String>,
    api_version: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookContext {
    /// Returns the topic exactly as received (empty if the header was absent).
    #[must_use]
    pub fn topic_raw(&self) -> &str {
        &self.topic_raw
    }

    /// Returns `true` for the `app/uninstalled` topic.
    #[must_use]
    pub fn is_app_uninstalled(&self) -> bool {
        self.topic_raw == TOPIC_APP_UNINSTALLED
    }

    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

/// Verifies `raw_body` against a base64 signature with a single secret.
///
/// ```rust
/// use token_relay::webhooks::verify_hmac;
/// use token_relay::auth::oauth::hmac::compute_signature_base64;
///
/// let hmac = compute_signature_base64(b"payload", "secret");
/// assert!(verify_hmac(b"payload", &hmac, "secret"));
/// assert!(!verify_hmac(b"payload", "invalid", "secret"));
/// ```
#[must_use]
pub fn verify_hmac(raw_body: &[u8], hmac_header: &str, secret: &str) -> bool {
    let computed = compute_signature_base64(raw_body, secret);
    constant_time_compare(&computed, hmac_header)
}

/// Verifies a webhook with the primary secret, then the old secret if one
/// is configured.
///
/// # Errors
///
/// - [`WebhookError::MissingHmac`] if the signature header is empty
/// - [`WebhookError::InvalidHmac`] if no secret produces the signature
pub fn verify_webhook(
    config: &ShopifyConfig,
    request: &WebhookRequest,
) -> Result<WebhookContext, WebhookError> {
    let hmac_header = request.hmac_header().trim();
    if hmac_header.is_empty() {
        return Err(WebhookError::MissingHmac);
    }

    let verified = config
        .signing_secrets()
        .any(|secret| verify_hmac(request.body(), hmac_header, secret));

    if !verified {
        return Err(WebhookError::InvalidHmac);
    }

    Ok(WebhookContext {
        topic_raw: request.topic().unwrap_or_default().to_string(),
        shop_domain: request.shop_domain().map(str::to_string),
        api_version: request.api_version().map(str::to_string),
        webhook_id: request.webhook_id().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};

    fn config(secret: &str, old: Option<&str>) -> ShopifyConfig {
        let mut builder = ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap());
        if let Some(old) = old {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
        }
        builder.build().unwrap()
    }

    fn request(body: &[u8], hmac: String, topic: &str) -> WebhookRequest {
        WebhookRequest::new(
            body.to_vec(),
            hmac,
            Some(topic.to_string()),
            Some("shop.myshopify.com".to_string()),
            Some("2024-10".to_string()),
            Some("delivery-1".to_string()),
        )
    }

    #[test]
    fn test_verify_webhook_accepts_valid_signature() {
        let body = b"{}";
        let req = request(body, compute_signature_base64(body, "secret"), "orders/create");

        let context = verify_webhook(&config("secret", None), &req).unwrap();
        assert_eq!(context.topic_raw(), "orders/create");
        assert!(!context.is_app_uninstalled());
        assert_eq!(context.shop_domain(), Some("shop.myshopify.com"));
        assert_eq!(context.api_version(), Some("2024-10"));
        assert_eq!(context.webhook_id(), Some("delivery-1"));
    }

    #[test]
    fn test_verify_webhook_rejects_wrong_secret() {
        let body = b"{}";
        let req = request(body, compute_signature_base64(body, "other"), "orders/create");

        let result = verify_webhook(&config("secret", None), &req);
        assert!(matches!(result, Err(WebhookError::InvalidHmac)));
    }

    #[test]
    fn test_verify_webhook_rejects_tampered_body() {
        let req = request(
            b"{\"id\":2}",
            compute_signature_base64(b"{\"id\":1}", "secret"),
            "orders/create",
        );

        let result = verify_webhook(&config("secret", None), &req);
        assert!(matches!(result, Err(WebhookError::InvalidHmac)));
    }

    #[test]
    fn test_verify_webhook_rejects_missing_header() {
        let req = request(b"{}", String::new(), "orders/create");

        let result = verify_webhook(&config("secret", None), &req);
        assert!(matches!(result, Err(WebhookError::MissingHmac)));
    }

    #[test]
    fn test_verify_webhook_falls_back_to_old_secret() {
        let body = b"{}";
        let req = request(body, compute_signature_base64(body, "old"), TOPIC_APP_UNINSTALLED);

        let context = verify_webhook(&config("new", Some("old")), &req).unwrap();
        assert!(context.is_app_uninstalled());
    }

    #[test]
    fn test_missing_topic_reads_as_empty() {
        let body = b"{}";
        let req = WebhookRequest::new(
            body.to_vec(),
            compute_signature_base64(body, "secret"),
            None,
            None,
            None,
            None,
        );

        let context = verify_webhook(&config("secret", None), &req).unwrap();
        assert_eq!(context.topic_raw(), "");
        assert_eq!(context.shop_domain(), None);
    }
}
