//! The authorization provider used by the HTTP layer.
//!
//! [`AuthProvider`] bundles the three Shopify-facing operations the routes
//! need. [`ShopifyAuth`] implements them on top of [`crate::auth::oauth`] and
//! [`crate::webhooks`], and remembers the state nonce of every authorization
//! in flight so the callback can be matched to its `/api/auth` request.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::auth::oauth::{
    begin_auth, validate_auth_callback_at, validate_hmac, AuthQuery, BeginAuthResult, OAuthError,
};
use crate::auth::Session;
use crate::config::{EnvConfig, ShopDomain};
use crate::webhooks::{verify_webhook, WebhookContext, WebhookError, WebhookRequest};

/// How long a state nonce stays valid after `/api/auth`.
pub const PENDING_AUTHORIZATION_TTL: Duration = Duration::from_secs(10 * 60);

/// Most authorizations kept in flight at once. The oldest is dropped first.
pub const MAX_PENDING_AUTHORIZATIONS: usize = 10_000;

/// Shopify operations behind the auth and webhook routes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Starts authorization for `shop` and returns the consent-screen URL.
    ///
    /// # Errors
    ///
    /// Fails when the API credentials or host name are not configured.
    fn begin(&self, shop: &ShopDomain) -> Result<BeginAuthResult, OAuthError>;

    /// Completes authorization from the callback query and returns the
    /// offline session.
    async fn callback(&self, query: &AuthQuery) -> Result<Session, OAuthError>;

    /// Verifies an incoming webhook.
    ///
    /// # Errors
    ///
    /// Fails on a missing or invalid signature, or when no secret is configured.
    fn verify_webhook(&self, request: &WebhookRequest) -> Result<WebhookContext, WebhookError>;
}

/// State nonces handed out by `begin`, keyed by the nonce.
///
/// `issued` lists nonces oldest first so expiry and eviction only ever look
/// at the front. Nonces consumed by a callback stay in `issued` until they
/// reach the front.
#[derive(Debug)]
struct PendingAuthorizations {
    by_state: HashMap<String, (ShopDomain, Instant)>,
    issued: VecDeque<(String, Instant)>,
    capacity: usize,
}

impl PendingAuthorizations {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            by_state: HashMap::new(),
            issued: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn len(&self) -> usize {
        self.by_state.len()
    }

    fn insert(&mut self, state: String, shop: ShopDomain, now: Instant) {
        self.prune_expired(now);

        while self.issued.len() >= self.capacity {
            let Some((oldest, _)) = self.issued.pop_front() else {
                break;
            };
            if let Some((shop, _)) = self.by_state.remove(&oldest) {
                warn!(shop = %shop, "Pending authorization limit reached, dropping oldest");
            }
        }

        self.by_state.insert(state.clone(), (shop, now));
        self.issued.push_back((state, now));
    }

    /// The shop a live nonce was issued for.
    fn shop_for(&self, state: &str, now: Instant) -> Option<&ShopDomain> {
        self.by_state
            .get(state)
            .filter(|(_, issued_at)| now.duration_since(*issued_at) < PENDING_AUTHORIZATION_TTL)
            .map(|(shop, _)| shop)
    }

    fn remove(&mut self, state: &str) {
        self.by_state.remove(state);
    }

    fn prune_expired(&mut self, now: Instant) {
        while let Some((_, issued_at)) = self.issued.front() {
            if now.duration_since(*issued_at) < PENDING_AUTHORIZATION_TTL {
                break;
            }
            if let Some((state, _)) = self.issued.pop_front() {
                self.by_state.remove(&state);
            }
        }
    }
}

/// [`AuthProvider`] backed by Shopify's OAuth endpoints.
///
/// Every `begin` issues its own nonce, so a second `/api/auth` for the same
/// shop leaves earlier authorizations valid.
pub struct ShopifyAuth {
    env: EnvConfig,
    callback_path: String,
    client: reqwest::Client,
    admin_origin: Option<String>,
    pending: Mutex<PendingAuthorizations>,
}

impl ShopifyAuth {
    /// Creates a provider that exchanges codes at `https://<shop>`.
    #[must_use]
    pub fn new(env: EnvConfig, callback_path: impl Into<String>) -> Self {
        Self {
            env,
            callback_path: callback_path.into(),
            client: reqwest::Client::new(),
            admin_origin: None,
            pending: Mutex::new(PendingAuthorizations::with_capacity(
                MAX_PENDING_AUTHORIZATIONS,
            )),
        }
    }

    /// Sends token exchange requests to `origin` instead of the shop's own
    /// domain. Used to point the provider at a local mock server.
    #[must_use]
    pub fn with_admin_origin(mut self, origin: impl Into<String>) -> Self {
        self.admin_origin = Some(origin.into());
        self
    }

    /// Limits how many authorizations may await their callback at once.
    /// Defaults to [`MAX_PENDING_AUTHORIZATIONS`].
    #[must_use]
    pub fn with_max_pending(self, max: usize) -> Self {
        Self {
            pending: Mutex::new(PendingAuthorizations::with_capacity(max)),
            ..self
        }
    }

    /// Number of authorizations awaiting their callback.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `state` if it is live and was issued for `shop`.
    fn expected_state(&self, shop: &ShopDomain, state: &str) -> Result<String, OAuthError> {
        let pending = self.pending.lock();
        match pending.shop_for(state, Instant::now()) {
            Some(issued_for) if issued_for == shop => Ok(state.to_string()),
            _ => Err(OAuthError::NoPendingAuthorization {
                shop: shop.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for ShopifyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAuth")
            .field("callback_path", &self.callback_path)
            .field("admin_origin", &self.admin_origin)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for ShopifyAuth {
    fn begin(&self, shop: &ShopDomain) -> Result<BeginAuthResult, OAuthError> {
        let config = self.env.shopify_config()?;
        let result = begin_auth(&config, shop, &self.callback_path)?;

        self.pending
            .lock()
            .insert(result.state.to_string(), shop.clone(), Instant::now());

        debug!(shop = %shop, "Authorization started");
        Ok(result)
    }

    async fn callback(&self, query: &AuthQuery) -> Result<Session, OAuthError> {
        let config = self.env.shopify_config()?;

        // Unsigned requests are rejected before the pending map is consulted
        if !validate_hmac(query, &config) {
            return Err(OAuthError::InvalidHmac);
        }

        let shop = ShopDomain::new(query.shop()).map_err(|_| OAuthError::InvalidCallback {
            reason: format!("Invalid shop domain: {}", query.shop()),
        })?;
        let expected_state = self.expected_state(&shop, query.state())?;

        let session = validate_auth_callback_at(
            &self.client,
            self.admin_origin.as_deref(),
            &config,
            query,
            &expected_state,
        )
        .await?;

        self.pending.lock().remove(&expected_state);
        debug!(shop = %shop, "Authorization completed");
        Ok(session)
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> Result<WebhookContext, WebhookError> {
        let config = self.env.shopify_config()?;
        verify_webhook(&config, request)
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyAuth>();
};
