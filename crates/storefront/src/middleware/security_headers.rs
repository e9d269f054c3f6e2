//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. Start locked down and
//! loosen only when specific functionality requires it: Stripe.js needs its
//! script, frames and API host, and analytics needs Google Tag Manager.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the Content-Security-Policy value for a request nonce.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…' https://js.stripe.com https://www.googletagmanager.com https://unpkg.com;
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' data: https://*.stripe.com https://www.google-analytics.com;
/// connect-src 'self' https://api.stripe.com https://*.google-analytics.com;
/// frame-src https://js.stripe.com https://hooks.stripe.com;
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self';
/// frame-ancestors 'none';
/// upgrade-insecure-requests
/// ```
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    let nonce_source = if nonce.is_empty() {
        String::new()
    } else {
        format!(" 'nonce-{nonce}'")
    };

    format!(
        "default-src 'none'; \
         script-src 'self'{nonce_source} https://js.stripe.com https://www.googletagmanager.com https://unpkg.com; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: https://*.stripe.com https://www.google-analytics.com; \
         connect-src 'self' https://api.stripe.com https://*.google-analytics.com; \
         frame-src https://js.stripe.com https://hooks.stripe.com; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin` - Stripe 3DS needs the origin
/// - `Content-Security-Policy` - see [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features, allow Payment Request for Stripe
/// - `Cache-Control: no-store, max-age=0` - Prevent caching session-bound pages
/// - `Cross-Origin-Opener-Policy: same-origin-allow-popups` - 3DS popups
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // Nonces are base64, always a valid header value
    if let Ok(csp) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, csp);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             hid=(), \
             interest-cohort=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(self \"https://js.stripe.com\"), \
             serial=(), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static("no-store, max-age=0"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_includes_nonce_and_stripe() {
        let csp = content_security_policy("abc123==");
        assert!(csp.contains("script-src 'self' 'nonce-abc123==' https://js.stripe.com"));
        assert!(csp.contains("frame-src https://js.stripe.com https://hooks.stripe.com"));
        assert!(csp.contains("connect-src 'self' https://api.stripe.com"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_csp_without_nonce() {
        let csp = content_security_policy("");
        assert!(csp.contains("script-src 'self' https://js.stripe.com"));
        assert!(!csp.contains("nonce-"));
    }
}
