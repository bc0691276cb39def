//! Shared application state for the Voro server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the token codec, the mail dispatcher,
//! and the inquiry rate limiter.

use std::sync::Arc;
use std::time::Duration;

use voro_core::mail::{MailSettings, MailTransport, Mailer};
use voro_core::rate_limit::FixedWindowLimiter;
use voro_core::token::TokenCodec;

use crate::config::ServerConfig;

/// Fallback origin when neither configuration nor the request supplies one.
pub const FALLBACK_ORIGIN: &str = "http://localhost";

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Intake token issue and verification.
    pub tokens: TokenCodec,
    /// Lead-flow mail dispatch.
    pub mailer: Mailer,
    /// Per-source inquiry limiter.
    pub limiter: FixedWindowLimiter,
    /// Configured public origin, preferred over the request origin.
    pub public_origin: Option<String>,
    /// Brand name for page copy.
    pub brand: String,
    /// Contact address shown on the privacy page.
    pub contact: Option<String>,
}

impl AppState {
    /// Assemble state from configuration and a transport.
    ///
    /// `transport` is `None` when SMTP credentials are absent; mail sends then
    /// fail with a configuration error at request time.
    #[must_use]
    pub fn from_config(config: &ServerConfig, transport: Option<Arc<dyn MailTransport>>) -> Self {
        let mailer = Mailer::new(
            transport,
            MailSettings {
                sender: config.mail_from.clone(),
                owner: config.mail_to.clone(),
                brand: config.brand.clone(),
            },
        );

        Self {
            tokens: TokenCodec::new(config.token_secret.as_deref()),
            mailer,
            limiter: FixedWindowLimiter::new(
                config.rate_limit_max,
                Duration::from_secs(config.rate_limit_window_secs),
            ),
            public_origin: config.public_origin.clone(),
            brand: config.brand.clone(),
            contact: config.mail_to.clone(),
        }
    }

    /// Origin for intake links: configuration, then the request, then
    /// [`FALLBACK_ORIGIN`].
    #[must_use]
    pub fn link_origin(&self, request_origin: Option<&str>) -> String {
        self.public_origin
            .as_deref()
            .or(request_origin)
            .unwrap_or(FALLBACK_ORIGIN)
            .trim_end_matches('/')
            .to_owned()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("brand", &self.brand)
            .field("public_origin", &self.public_origin)
            .finish_non_exhaustive()
    }
}
