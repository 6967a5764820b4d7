//! HMAC validation for Shopify OAuth callbacks and webhook verification.
//!
//! OAuth callbacks are signed with a lowercase hex HMAC-SHA256 over the sorted
//! query string; webhooks with a base64 HMAC-SHA256 over the raw body. All
//! comparisons are constant-time.
//!
//! # Example
//!
//! ```rust
//! use token_relay::auth::oauth::hmac::{compute_signature, compute_signature_base64};
//!
//! let signature = compute_signature("code=abc123&shop=example.myshopify.com", "my-api-secret");
//! assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
//!
//! let webhook_sig = compute_signature_base64(b"webhook payload", "my-api-secret");
//! assert_eq!(webhook_sig.len(), 44);
//! ```

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

/// Computes a lowercase hex HMAC-SHA256 signature for `message`.
///
/// ```rust
/// use token_relay::auth::oauth::hmac::compute_signature;
///
/// assert_eq!(
///     compute_signature("message", "key"),
///     "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
/// );
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac = mac_for(secret);
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Computes a base64 HMAC-SHA256 signature for raw bytes, as sent in the
/// `X-Shopify-Hmac-SHA256` webhook header.
#[must_use]
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    let mut mac = mac_for(secret);
    mac.update(message);
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Performs constant-time comparison of two strings.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the HMAC signature of an OAuth callback.
///
/// The primary secret is tried first, then the old secret if configured.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, config: &ShopifyConfig) -> bool {
    let signable = query.to_signable_string();

    config.signing_secrets().any(|secret| {
        let computed = compute_signature(&signable, secret);
        constant_time_compare(&computed, &query.hmac)
    })
}

mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};

    fn config_with(secret: &str, old: Option<&str>) -> ShopifyConfig {
        let mut builder = ShopifyConfig::builder()
            .api_key(ApiKey::new("test-key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap());
        if let Some(old) = old {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
        }
        builder.build().unwrap()
    }

    fn signed_query(secret: &str) -> AuthQuery {
        let mut query = AuthQuery::new(
            "auth-code".to_string(),
            "test-shop.myshopify.com".to_string(),
            "1234567890".to_string(),
            "state-value".to_string(),
            "host-value".to_string(),
            String::new(),
        );
        query.hmac = compute_signature(&query.to_signable_string(), secret);
        query
    }

    #[test]
    fn test_compute_signature_matches_known_value() {
        assert_eq!(
            compute_signature("message", "key"),
            "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
        );
    }

    #[test]
    fn test_compute_signature_base64_matches_known_value() {
        // Same HMAC as above, base64 encoded
        assert_eq!(
            compute_signature_base64(b"message", "key"),
            "bp7ym3X//Ft6uuUn1Y/a2y/kLnIZARl2kXNDBl9Y7Uo="
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("short", "longer string"));
    }

    #[test]
    fn test_validate_hmac_succeeds_with_correct_hmac() {
        let config = config_with("test-secret", None);
        assert!(validate_hmac(&signed_query("test-secret"), &config));
    }

    #[test]
    fn test_validate_hmac_fails_with_wrong_secret() {
        let config = config_with("test-secret", None);
        assert!(!validate_hmac(&signed_query("other-secret"), &config));
    }

    #[test]
    fn test_validate_hmac_falls_back_to_old_secret() {
        let config = config_with("new-secret", Some("old-secret"));
        assert!(validate_hmac(&signed_query("old-secret"), &config));
    }

    #[test]
    fn test_validate_hmac_fails_when_params_are_tampered() {
        let config = config_with("test-secret", None);
        let query = signed_query("test-secret");
        let tampered = AuthQuery::new(
            query.code().to_string(),
            "evil-shop.myshopify.com".to_string(),
            query.timestamp().to_string(),
            query.state().to_string(),
            "host-value".to_string(),
            query.hmac.clone(),
        );
        assert!(!validate_hmac(&tampered, &config));
    }
}
