//! Middleware that stamps a `Content-Security-Policy` header on every response.

use axum::{
    extract::Request,
    http::{header::CONTENT_SECURITY_POLICY, HeaderValue},
    response::Response,
};
use core::fmt;
use std::{future::Future, pin::Pin};
use tower::{Layer, Service};

/// Policy for an app that is never rendered inside the Shopify admin.
pub const NON_EMBEDDED_POLICY: &str = "frame-ancestors 'none';";

/// A layer that sets `Content-Security-Policy` on every response, replacing
/// any value a handler set.
#[derive(Clone)]
pub struct CspLayer {
    policy: HeaderValue,
}

impl CspLayer {
    /// Create a layer with the given policy.
    pub const fn new(policy: HeaderValue) -> Self {
        Self { policy }
    }

    /// Create a layer with [`NON_EMBEDDED_POLICY`].
    pub fn non_embedded() -> Self {
        Self::new(HeaderValue::from_static(NON_EMBEDDED_POLICY))
    }
}

impl Default for CspLayer {
    fn default() -> Self {
        Self::non_embedded()
    }
}

impl fmt::Debug for CspLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CspLayer")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<S> Layer<S> for CspLayer {
    type Service = CspService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CspService {
            inner,
            policy: self.policy.clone(),
        }
    }
}

/// The service produced by [`CspLayer`].
#[derive(Clone)]
pub struct CspService<S> {
    inner: S,
    policy: HeaderValue,
}

impl<S> fmt::Debug for CspService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CspService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for CspService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let future = self.inner.call(req);
        let policy = self.policy.clone();

        Box::pin(async move {
            let mut response = future.await?;
            response
                .headers_mut()
                .insert(CONTENT_SECURITY_POLICY, policy);
            Ok(response)
        })
    }
}
