//! Intake route: `POST /api/intake`.
//!
//! Accepts a project brief and forwards it to the owner. The submitter's
//! email comes from a verified intake token when one is supplied; otherwise
//! a literal `email` field is accepted. A supplied token always wins, and a
//! bad token is rejected even when a literal email is also present.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use voro_core::brief::{IntakeBrief, non_blank, normalize_email};
use voro_core::token::TokenCodec;

use crate::error::AppError;
use crate::extract::UserAgent;
use crate::routes::OkResponse;
use crate::state::AppState;

/// Intake request body. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntakeRequest {
    pub token: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub goals: Option<String>,
    pub details: Option<String>,
}

/// Build the intake router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/intake", post(submit_intake))
}

async fn submit_intake(
    State(state): State<Arc<AppState>>,
    UserAgent(user_agent): UserAgent,
    payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    process(&state, user_agent, payload)
        .await
        .inspect_err(|e| e.log("intake"))
}

async fn process(
    state: &AppState,
    user_agent: Option<String>,
    payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(body) = payload?;

    let email = resolve_email(&state.tokens, body.token.as_deref(), body.email.as_deref())?;

    let brief = IntakeBrief {
        email,
        full_name: present(body.full_name),
        company: present(body.company),
        website: present(body.website),
        project_type: present(body.project_type),
        budget: present(body.budget),
        timeline: present(body.timeline),
        goals: present(body.goals),
        details: present(body.details),
        user_agent,
    };
    brief.validate()?;

    state.mailer.send_intake_to_owner(&brief).await?;

    info!("intake brief accepted");
    Ok(Json(OkResponse::ok()))
}

/// Token email if a token is supplied, else the literal email.
fn resolve_email(
    tokens: &TokenCodec,
    token: Option<&str>,
    literal: Option<&str>,
) -> Result<String, AppError> {
    if let Some(token) = non_blank(token) {
        let claims = tokens.verify(token.trim())?;
        return Ok(claims.email);
    }

    match non_blank(literal) {
        Some(email) => Ok(normalize_email(email)?),
        None => Err(AppError::MissingEmail),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
