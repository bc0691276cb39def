//! HTTP error types for the Voro server.
//!
//! Maps domain errors from `voro-core` into HTTP responses. Every response
//! body has the shape `{ "ok": false, "error": ..., "code": ... }`. Server
//! faults carry a generic message; their detail goes to the log only.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use voro_core::error::{BriefError, MailError, TokenError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed body, bad email, or an over-long field.
    Validation(String),
    /// The intake token failed verification.
    InvalidToken,
    /// Neither a token nor a literal email was supplied.
    MissingEmail,
    /// SMTP credentials or a sender/owner address are absent or unparsable.
    MailConfigMissing(String),
    /// The mail transport failed.
    MailSendFailure(String),
    /// Any other server fault.
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidToken | Self::MissingEmail => {
                StatusCode::BAD_REQUEST
            }
            Self::MailConfigMissing(_) | Self::MailSendFailure(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code sent to clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidToken => "invalid_token",
            Self::MissingEmail => "missing_email",
            Self::MailConfigMissing(_) | Self::MailSendFailure(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Whether the fault lies with the server rather than the request.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }

    /// Client-facing message. Server faults never reveal detail.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidToken => "This link is invalid or has expired.".to_owned(),
            Self::MissingEmail => "An email address is required.".to_owned(),
            Self::MailConfigMissing(_) | Self::MailSendFailure(_) | Self::Internal(_) => {
                "Something went wrong. Please try again later.".to_owned()
            }
        }
    }

    /// Log this error at a level matching its cause.
    pub fn log(&self, context: &'static str) {
        match self {
            Self::MailConfigMissing(detail) => error!(context, detail = %detail, "configuration error"),
            Self::MailSendFailure(detail) => error!(context, detail = %detail, "mail dispatch failed"),
            Self::Internal(detail) => error!(context, detail = %detail, "internal error"),
            Self::Validation(detail) => warn!(context, detail = %detail, "request rejected"),
            Self::InvalidToken | Self::MissingEmail => {
                warn!(context, code = self.code(), "request rejected");
            }
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: self.public_message(),
            code: self.code(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Inquiry failure: every cause answers 400 with a bare `{ "ok": false }`.
#[derive(Debug)]
pub struct InquiryError(pub AppError);

#[derive(Serialize)]
struct BareFailure {
    ok: bool,
}

impl IntoResponse for InquiryError {
    fn into_response(self) -> Response {
        self.0.log("inquiry");
        (StatusCode::BAD_REQUEST, Json(BareFailure { ok: false })).into_response()
    }
}

impl From<AppError> for InquiryError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::InvalidToken,
            TokenError::SecretMissing | TokenError::Signing { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        if err.is_config() {
            Self::MailConfigMissing(err.to_string())
        } else {
            Self::MailSendFailure(err.to_string())
        }
    }
}

impl From<BriefError> for AppError {
    fn from(err: BriefError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn client_errors_are_400_with_code() {
        let response = AppError::MissingEmail.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "missing_email");
    }

    #[tokio::test]
    async fn server_faults_hide_detail() {
        let err = AppError::from(MailError::SendFailure {
            reason: "535 auth failed for reed@gmail.com".to_owned(),
        });
        assert!(err.is_server_fault());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "server_error");
        assert!(!body["error"].as_str().unwrap().contains("535"));
    }

    #[test]
    fn domain_errors_map_to_codes() {
        assert_eq!(AppError::from(TokenError::Invalid).code(), "invalid_token");
        assert_eq!(AppError::from(TokenError::SecretMissing).code(), "server_error");
        assert_eq!(AppError::from(BriefError::InvalidEmail).code(), "validation_error");
        assert!(matches!(
            AppError::from(MailError::ConfigMissing { what: "owner address" }),
            AppError::MailConfigMissing(_)
        ));
    }

    #[test]
    fn only_configured_addresses_count_as_config_faults() {
        let misconfigured = AppError::from(MailError::MisconfiguredAddress {
            what: "owner address",
            address: "owner at voro".to_owned(),
            reason: "missing @".to_owned(),
        });
        assert!(matches!(misconfigured, AppError::MailConfigMissing(_)));

        let bad_recipient = AppError::from(MailError::InvalidAddress {
            address: "a@@b".to_owned(),
            reason: "invalid".to_owned(),
        });
        assert!(matches!(bad_recipient, AppError::MailSendFailure(_)));
    }

    #[tokio::test]
    async fn inquiry_errors_are_bare_400() {
        let response = InquiryError(AppError::Internal("boom".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "ok": false }));
    }
}
