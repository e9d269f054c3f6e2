//! Per-request CSP nonce.
//!
//! Every storefront page carries script tags that must pass the
//! `script-src` policy: htmx and the GA4 loader in `base.html`, the inline
//! `gtag` bootstrap, Stripe.js and `checkout.js` on the checkout page. Each
//! of them is stamped with the request's nonce, and
//! [`security_headers_middleware`](super::security_headers_middleware)
//! writes the same value into the `Content-Security-Policy` header.
//!
//! Page handlers take the nonce with the [`CspNonce`] extractor and hand it
//! to their template as `nonce`.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Nonce bytes before encoding.
const NONCE_BYTES: usize = 16;

/// Base64 nonce shared by a page's script tags and its CSP header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Fresh random nonce.
    #[must_use]
    pub fn generate() -> Self {
        Self(STANDARD.encode(rand::random::<[u8; NONCE_BYTES]>()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attach a new [`CspNonce`] to the request.
///
/// Must run inside `security_headers_middleware` so the header and the
/// rendered page see the same value.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

/// Reads the nonce set by [`csp_nonce_middleware`].
///
/// Without the middleware the nonce is empty and every script on the page
/// is blocked, which shows up immediately in the browser console.
impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(path = %parts.uri.path(), "request has no CSP nonce; scripts will be blocked");
            Self(String::new())
        }))
    }
}
