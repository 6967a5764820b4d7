//! OAuth 2.0 authorization code flow for Shopify apps.
//!
//! 1. **Authorization Initiation** ([`begin_auth`]): build the consent-screen
//!    URL and a state nonce.
//! 2. **Callback Validation** ([`validate_auth_callback`]): verify the HMAC and
//!    state, then exchange the code for a permanent access token.
//!
//! Only offline (app-level) tokens are requested; this app is not embedded.

mod auth_query;
mod begin_auth;
mod error;
pub mod hmac;
mod state;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::OAuthError;
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
pub use state::StateParam;
pub use validate_callback::validate_auth_callback;

pub(crate) use validate_callback::validate_auth_callback_at;
