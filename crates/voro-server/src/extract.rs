//! Request-derived values used by the API handlers.
//!
//! Each extractor reads request headers only and never rejects.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{HOST, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use voro_core::brief::MAX_FIELD_LEN;

/// Rate-limit key: the leftmost `X-Forwarded-For` entry, or `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSource(pub String);

/// Origin the request was made against, from `X-Forwarded-Proto` and `Host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub Option<String>);

/// The submitting browser's `User-Agent`, truncated to the field limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientSource {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_source(&parts.headers)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_origin(&parts.headers)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserAgent {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agent = header_str(&parts.headers, USER_AGENT.as_str())
            .map(|ua| ua.chars().take(MAX_FIELD_LEN).collect());
        Ok(Self(agent))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Leftmost hop of `X-Forwarded-For`, or `"unknown"`.
pub fn client_source(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}

/// `{proto}://{host}` from forwarding headers. Proto defaults to `http`.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = header_str(headers, "x-forwarded-host").or_else(|| header_str(headers, HOST.as_str()))?;
    let proto = header_str(headers, "x-forwarded-proto")
        .and_then(|p| p.split(',').next())
        .map(str::trim)
        .filter(|p| *p == "http" || *p == "https")
        .unwrap_or("http");
    Some(format!("{proto}://{host}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn source_is_leftmost_forwarded_hop() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(client_source(&h), "203.0.113.7");
    }

    #[test]
    fn source_defaults_to_unknown() {
        assert_eq!(client_source(&HeaderMap::new()), "unknown");
        assert_eq!(client_source(&headers(&[("x-forwarded-for", " ")])), "unknown");
    }

    #[test]
    fn origin_from_proto_and_host() {
        let h = headers(&[("host", "voro.ink"), ("x-forwarded-proto", "https")]);
        assert_eq!(request_origin(&h).as_deref(), Some("https://voro.ink"));
    }

    #[test]
    fn origin_defaults_to_http_and_ignores_odd_proto() {
        let h = headers(&[("host", "localhost:3000")]);
        assert_eq!(request_origin(&h).as_deref(), Some("http://localhost:3000"));

        let h = headers(&[("host", "a.test"), ("x-forwarded-proto", "javascript")]);
        assert_eq!(request_origin(&h).as_deref(), Some("http://a.test"));
    }

    #[test]
    fn origin_absent_without_host() {
        assert!(request_origin(&HeaderMap::new()).is_none());
    }
}
