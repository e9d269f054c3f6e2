//! Origin checks for the waitlist API.
//!
//! The marketing site posts to `/api/waitlist` cross-origin, so the API
//! carries a CORS layer for that one origin. Requests that do send an
//! `Origin` header from anywhere else are refused outright; requests without
//! one (curl, server-to-server) pass through to the honeypot and rate limits.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::AppError;
use crate::state::AppState;

/// Whether a request origin may call the waitlist API.
///
/// Both the configured allow-listed origin and the storefront's own origin
/// are accepted.
#[must_use]
pub fn is_allowed_origin(origin: &str, allowed_origin: &str, base_url: &str) -> bool {
    let origin = origin.trim_end_matches('/');
    origin == allowed_origin.trim_end_matches('/') || origin == base_url.trim_end_matches('/')
}

/// Reject requests whose `Origin` header is present and not allowed.
pub async fn require_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let config = state.config();
        let allowed = origin.to_str().is_ok_and(|origin| {
            is_allowed_origin(origin, &config.waitlist.allowed_origin, &config.base_url)
        });
        if !allowed {
            tracing::warn!(origin = ?origin, "waitlist request from forbidden origin");
            return AppError::Forbidden("Forbidden origin".to_owned()).into_response();
        }
    }

    next.run(request).await
}

/// CORS layer allowing the marketing site to call the waitlist API.
///
/// An origin that is not a valid header value disables cross-origin access.
#[must_use]
pub fn waitlist_cors_layer(allowed_origin: &str) -> CorsLayer {
    let allow_origin = HeaderValue::from_str(allowed_origin.trim_end_matches('/'))
        .map_or_else(|_| AllowOrigin::list([]), AllowOrigin::exact);

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allow_origin)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins() {
        let allowed = "https://www.wearatmos.com";
        let base = "https://shop.wearatmos.com/";
        assert!(is_allowed_origin("https://www.wearatmos.com", allowed, base));
        assert!(is_allowed_origin("https://shop.wearatmos.com", allowed, base));
        assert!(!is_allowed_origin("https://evil.example", allowed, base));
        assert!(!is_allowed_origin("http://www.wearatmos.com", allowed, base));
    }
}
