use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
};
use std::net::SocketAddr;

use crate::model::VisitorKey;

/// Header carrying the per-tab session token
pub const SESSION_HEADER: &str = "x-emotion-session";

/// Session id used when a client sends no token
pub const ANONYMOUS_SESSION: &str = "anonymous";

/// Axum extractor for the visitor identity a submission is scoped to
///
/// The network address comes from, in order:
/// - the first entry of X-Forwarded-For
/// - X-Real-IP
/// - the peer socket address (when served with connect info)
/// - "unknown"
///
/// The session token comes from X-Emotion-Session.
#[async_trait]
impl<S> FromRequestParts<S> for VisitorKey
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let address = network_address(&parts.headers)
            .or(peer)
            .unwrap_or_else(|| "unknown".to_string());
        let session_id = extract_header_value(&parts.headers, SESSION_HEADER)
            .unwrap_or_else(|| ANONYMOUS_SESSION.to_string());

        Ok(VisitorKey::new(address, session_id))
    }
}

/// Client address as reported by proxies
fn network_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = extract_header_value(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next().map(str::trim) {
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    extract_header_value(headers, "x-real-ip")
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_forwarded_for_takes_first_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("198.51.100.4, 10.0.0.2"),
        );
        headers.insert(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("10.0.0.9"),
        );
        assert_eq!(network_address(&headers), Some("198.51.100.4".to_string()));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("10.0.0.9"),
        );
        assert_eq!(network_address(&headers), Some("10.0.0.9".to_string()));
        assert_eq!(network_address(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_visitor_key_extraction() {
        let request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .header(SESSION_HEADER, "session_1_abcdefghi")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let visitor = VisitorKey::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(visitor, VisitorKey::new("203.0.113.7", "session_1_abcdefghi"));
    }

    #[tokio::test]
    async fn test_visitor_without_headers() {
        let request = axum::http::Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let visitor = VisitorKey::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(visitor, VisitorKey::new("unknown", ANONYMOUS_SESSION));
    }
}
