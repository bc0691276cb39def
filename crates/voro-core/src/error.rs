//! Error types for `voro-core`.
//!
//! Token errors are deliberately coarse: a caller learns that a link is not
//! usable, never why. Mail errors carry transport detail for server-side
//! logs only and must not be echoed to clients.

/// Errors from the intake token codec.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signing secret is not configured.
    #[error("intake token secret is not configured")]
    SecretMissing,

    /// Bad signature, malformed structure, or elapsed expiry.
    #[error("invalid intake token")]
    Invalid,

    /// Encoding the claims failed.
    #[error("intake token signing failed: {reason}")]
    Signing { reason: String },
}

/// Errors from the mail dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Credentials, sender, or owner address absent from configuration.
    #[error("mail configuration missing: {what}")]
    ConfigMissing { what: &'static str },

    /// A configured sender or owner address could not be parsed.
    #[error("configured {what} '{address}' is invalid: {reason}")]
    MisconfiguredAddress {
        what: &'static str,
        address: String,
        reason: String,
    },

    /// A recipient or reply-to address could not be parsed.
    #[error("invalid mail address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled.
    #[error("failed to build message: {reason}")]
    Build { reason: String },

    /// The transport rejected or failed to deliver the message.
    #[error("mail send failed: {reason}")]
    SendFailure { reason: String },
}

impl MailError {
    /// Whether this error stems from deployment configuration rather than
    /// delivery.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing { .. } | Self::MisconfiguredAddress { .. }
        )
    }
}

/// Errors from intake brief validation.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// The email address is not syntactically valid.
    #[error("invalid email address")]
    InvalidEmail,

    /// A field exceeds its maximum length.
    #[error("field '{field}' exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}
