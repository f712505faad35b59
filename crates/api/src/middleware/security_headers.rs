//! Security headers middleware.
//!
//! Adds security-related HTTP headers to all responses.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Header values applied to every response.
const STATIC_HEADERS: &[(&str, &str)] = &[
    (headers::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (headers::X_FRAME_OPTIONS, "DENY"),
    (headers::X_XSS_PROTECTION, "1; mode=block"),
    (headers::REFERRER_POLICY, "no-referrer"),
];

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Middleware that adds security headers to all responses.
///
/// Strict-Transport-Security is only added when `security.hsts_enabled` is
/// set; it must only be enabled when TLS terminates in front of the service.
pub async fn security_headers_middleware(
    State(hsts_enabled): State<bool>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for &(name, value) in STATIC_HEADERS {
        headers.insert(
            header::HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    // Handlers may opt in to caching explicitly.
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    if hsts_enabled {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}

/// Security header names as constants for testing and documentation.
pub mod headers {
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const X_XSS_PROTECTION: &str = "x-xss-protection";
    pub const REFERRER_POLICY: &str = "referrer-policy";
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(hsts_enabled: bool) -> Router {
        Router::new()
            .route("/", get(|| async { StatusCode::OK }))
            .layer(middleware::from_fn_with_state(
                hsts_enabled,
                security_headers_middleware,
            ))
    }

    async fn call(hsts_enabled: bool) -> Response {
        app(hsts_enabled)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    // ===========================================
    // Header Presence Tests
    // ===========================================

    #[tokio::test]
    async fn test_static_headers_added() {
        let response = call(false).await;
        let sent = response.headers();

        assert_eq!(sent[headers::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(sent[headers::X_FRAME_OPTIONS], "DENY");
        assert_eq!(sent[headers::X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(sent[headers::REFERRER_POLICY], "no-referrer");
        assert_eq!(sent[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_hsts_only_when_enabled() {
        let response = call(false).await;
        assert!(!response
            .headers()
            .contains_key(header::STRICT_TRANSPORT_SECURITY));

        let response = call(true).await;
        assert_eq!(
            response.headers()[header::STRICT_TRANSPORT_SECURITY],
            HSTS_VALUE
        );
    }

    #[test]
    fn test_header_constants_lowercase() {
        for (name, _) in STATIC_HEADERS {
            assert!(name.chars().all(|c| c.is_lowercase() || c == '-'));
        }
    }
}
