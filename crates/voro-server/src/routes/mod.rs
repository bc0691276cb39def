//! HTTP route modules and router assembly.
//!
//! - `/` `/i` `/privacy` — server-rendered pages
//! - `/api/inquiry` — email capture, owner notification, auto-reply
//! - `/api/intake` — brief submission, owner digest
//! - `/api/health` — liveness

pub mod health;
pub mod inquiry;
pub mod intake;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::{HeaderName, HeaderValue};
use serde::Serialize;
use tower::Layer;
use tower::limit::{ConcurrencyLimit, ConcurrencyLimitLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Upper bound on concurrently processed API requests, across all API routes.
pub const API_CONCURRENCY_LIMIT: usize = 64;

/// Content Security Policy applied to every response.
pub const CONTENT_SECURITY: &str = "default-src 'self'; \
    img-src 'self' data: https:; \
    script-src 'self' 'unsafe-inline'; \
    style-src 'self' 'unsafe-inline'; \
    connect-src 'self' https:; \
    font-src 'self' data: https:; \
    frame-ancestors 'none'";

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Success body shared by the API handlers.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// The `/api` routes behind one concurrency limit.
///
/// Clones of the returned service share a single semaphore, so `limit`
/// bounds in-flight requests across every API route together.
pub fn limited_api(state: Arc<AppState>, limit: usize) -> ConcurrencyLimit<Router> {
    let api = Router::new()
        .merge(inquiry::router())
        .merge(intake::router())
        .merge(health::router())
        .with_state(state);

    ConcurrencyLimitLayer::new(limit).layer(api)
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest_service("/api", limited_api(Arc::clone(&state), API_CONCURRENCY_LIMIT))
        .merge(pages::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PERMISSIONS_POLICY,
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY),
        ))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Shared fixtures for router tests.

    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use tower::ServiceExt;
    use voro_core::mail::MemoryTransport;

    use crate::config::ServerConfig;
    use crate::state::AppState;

    pub const OWNER: &str = "owner@voro.ink";

    pub fn config() -> ServerConfig {
        ServerConfig::from_lookup(|key| {
            let value = match key {
                "TOKEN_SECRET" => "test-secret-of-reasonable-length",
                "MAIL_FROM" => "Voro <hello@voro.ink>",
                "MAIL_TO" => OWNER,
                "VORO_PUBLIC_ORIGIN" => "https://voro.ink",
                _ => return None,
            };
            Some(value.to_owned())
        })
    }

    pub fn app_with(config: &ServerConfig, transport: &MemoryTransport) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::from_config(
            config,
            Some(Arc::new(transport.clone())),
        ));
        (super::build_router(Arc::clone(&state)), state)
    }

    pub fn app(transport: &MemoryTransport) -> Router {
        app_with(&config(), transport).0
    }

    pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn send(app: Router, request: Request<Body>) -> (u16, serde_json::Value) {
        let response: Response<Body> = app.oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tower::{Service, ServiceExt};
    use voro_core::mail::MemoryTransport;

    use super::limited_api;
    use super::test_support::{app, app_with, config};

    #[tokio::test]
    async fn api_limit_is_shared_across_routes() {
        let (_, state) = app_with(&config(), &MemoryTransport::new());
        let mut first = limited_api(Arc::clone(&state), 1);
        let mut second = first.clone();

        ServiceExt::<Request<Body>>::ready(&mut first).await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            ServiceExt::<Request<Body>>::ready(&mut second),
        )
        .await;
        assert!(blocked.is_err(), "second clone must wait for the only permit");

        let response = first
            .call(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        ServiceExt::<Request<Body>>::ready(&mut second).await.unwrap();
        let response = second
            .call(
                Request::post("/intake")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn every_response_carries_security_headers() {
        for uri in ["/", "/api/health", "/does-not-exist"] {
            let response = app(&MemoryTransport::new())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let headers = response.headers();
            assert_eq!(headers["x-frame-options"], "DENY");
            assert_eq!(headers["x-content-type-options"], "nosniff");
            assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
            assert_eq!(
                headers["permissions-policy"],
                "camera=(), microphone=(), geolocation=()"
            );
            let csp = headers["content-security-policy"].to_str().unwrap();
            assert!(csp.contains("frame-ancestors 'none'"));
        }
    }
}
