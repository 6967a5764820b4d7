//! State parameter handling for OAuth CSRF protection.
//!
//! A [`StateParam`] is a 15-character alphanumeric nonce generated with a
//! cryptographically secure RNG. It is sent to Shopify in the authorization
//! URL and must come back unchanged on the callback.
//!
//! ```rust
//! use token_relay::auth::oauth::StateParam;
//!
//! let state = StateParam::new();
//! assert_eq!(state.nonce().len(), 15);
//! ```

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// OAuth state parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam {
    value: String,
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    const NONCE_LENGTH: usize = 15;

    /// Creates a new state parameter with a secure random nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self { value: nonce }
    }

    /// Wraps an arbitrary string, used as-is.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { value: raw.into() }
    }

    /// Returns the nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.value
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
