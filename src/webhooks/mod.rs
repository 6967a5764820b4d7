//! Incoming webhook verification.
//!
//! - [`WebhookRequest`]: raw body plus Shopify's webhook headers
//! - [`verify_webhook`]: HMAC check with key rotation, yielding a [`WebhookContext`]
//! - [`WebhookError`]: why a webhook was rejected
//!
//! The relay only acts on `app/uninstalled`; every other verified topic is
//! acknowledged and ignored.

mod errors;
mod verification;

pub use errors::WebhookError;
pub use verification::{
    verify_hmac, verify_webhook, WebhookContext, WebhookRequest, HEADER_API_VERSION, HEADER_HMAC,
    HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID, TOPIC_APP_UNINSTALLED,
};
