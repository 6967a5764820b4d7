//! Webhook verification errors.

use crate::error::ConfigError;
use thiserror::Error;

/// Error type for webhook verification.
///
/// Messages carry no detail about keys or expected signatures.
///
/// # Example
///
/// ```rust
/// use token_relay::webhooks::WebhookError;
///
/// let error = WebhookError::InvalidHmac;
/// assert_eq!(error.to_string(), "Webhook signature verification failed");
/// ```
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The `X-Shopify-Hmac-SHA256` header was absent or empty.
    #[error("Missing webhook signature header")]
    MissingHmac,

    /// The signature did not match the body under any configured secret.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// No API secret is configured, so nothing can be verified.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hmac_error_message() {
        let message = WebhookError::InvalidHmac.to_string();
        assert_eq!(message, "Webhook signature verification failed");
        assert!(!message.contains("key"));
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_missing_hmac_error_message() {
        assert!(WebhookError::MissingHmac.to_string().contains("Missing"));
    }

    #[test]
    fn test_from_config_error_conversion() {
        let error: WebhookError = ConfigError::MissingRequiredField {
            field: "api_secret_key",
        }
        .into();

        assert!(matches!(error, WebhookError::Config(_)));
        assert!(error.to_string().contains("api_secret_key"));
    }
}
