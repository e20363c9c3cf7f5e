//! Request inspection.
//!
//! Extracts the routing-relevant parts of an incoming request.

use axum::http::{header, Request};

/// Domain a request was addressed to, lowercased and without port.
///
/// Reads the `Host` header first, then the URI authority (HTTP/2).
pub fn request_domain<B>(request: &Request<B>) -> Option<String> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())?;
    normalize_host(host)
}

/// Strip the port from a host value and lowercase it.
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim();
    let name = match host.strip_prefix('[') {
        // IPv6 literal: keep the brackets, drop anything after them
        Some(rest) => match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        },
        None => host.split_once(':').map_or(host, |(name, _)| name),
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Example.COM:8080").as_deref(), Some("example.com"));
        assert_eq!(normalize_host("api.local").as_deref(), Some("api.local"));
        assert_eq!(normalize_host("[::1]:3000").as_deref(), Some("[::1]"));
        assert_eq!(normalize_host("[::1]").as_deref(), Some("[::1]"));
        assert_eq!(normalize_host(":80"), None);
        assert_eq!(normalize_host(""), None);
    }

    #[test]
    fn test_request_domain_prefers_host_header() {
        let req = Request::builder()
            .uri("http://fallback.test/x")
            .header(header::HOST, "Shop.Example:443")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_domain(&req).as_deref(), Some("shop.example"));

        let req = Request::builder()
            .uri("http://Fallback.Test:8080/x")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_domain(&req).as_deref(), Some("fallback.test"));

        let req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert_eq!(request_domain(&req), None);
    }
}
