//! Inquiry route: `POST /api/inquiry`.
//!
//! Captures an email address from the landing page, notifies the owner, and
//! mails the inquirer a tokenized link to the intake form. Honeypot hits and
//! rate-limited sources get the same `{ "ok": true }` a real submission gets,
//! so automated senders learn nothing. Every failure answers 400 with a bare
//! `{ "ok": false }`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info, warn};

use voro_core::brief::{non_blank, normalize_email};

use crate::error::{AppError, InquiryError};
use crate::extract::{ClientSource, RequestOrigin};
use crate::routes::OkResponse;
use crate::state::AppState;

/// Inquiry request body.
#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    pub email: Option<String>,
    /// Honeypot. Hidden from people; any non-blank value marks a bot.
    #[serde(default)]
    pub hp: Option<String>,
}

/// Build the inquiry router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/inquiry", post(submit_inquiry))
}

async fn submit_inquiry(
    State(state): State<Arc<AppState>>,
    ClientSource(source): ClientSource,
    RequestOrigin(origin): RequestOrigin,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, InquiryError> {
    let Json(body) = payload.map_err(AppError::from)?;

    let email = normalize_email(body.email.as_deref().unwrap_or_default()).map_err(AppError::from)?;

    if non_blank(body.hp.as_deref()).is_some() {
        debug!(source = %source, "inquiry honeypot tripped");
        return Ok(Json(OkResponse::ok()));
    }

    if !state.limiter.check(&source) {
        warn!(source = %source, "inquiry rate limit exceeded");
        return Ok(Json(OkResponse::ok()));
    }

    let token = state.tokens.issue(&email).map_err(AppError::from)?;
    let link_origin = state.link_origin(origin.as_deref());

    let (notified, replied) = tokio::join!(
        state.mailer.notify_owner(&email),
        state.mailer.auto_reply(&email, &token, &link_origin),
    );
    notified.map_err(AppError::from)?;
    replied.map_err(AppError::from)?;

    info!(source = %source, "inquiry processed");
    Ok(Json(OkResponse::ok()))
}
