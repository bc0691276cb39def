//! Transactional mail dispatch.
//!
//! The [`Mailer`] composes the three messages the lead flow sends (owner
//! notification, inquirer auto-reply, owner digest of an intake brief) and
//! hands them to a single shared [`MailTransport`]. Two transports exist:
//!
//! - [`SmtpTransport`] — production, an authenticated SMTP relay via `lettre`
//! - [`MemoryTransport`] — in-memory outbox, for testing only

mod memory;
mod smtp;
pub mod templates;

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

pub use memory::MemoryTransport;
pub use smtp::{SmtpSettings, SmtpTransport, parse_mailbox};

use crate::brief::IntakeBrief;
use crate::error::MailError;

/// A fully addressed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender mailbox, e.g. `Voro <hello@voro.ink>`.
    pub from: String,
    /// Recipient mailbox.
    pub to: String,
    /// Optional `Reply-To` mailbox.
    pub reply_to: Option<String>,
    pub subject: String,
    /// Plain-text body (always present).
    pub text: String,
    /// Optional HTML alternative.
    pub html: Option<String>,
}

/// A pluggable outbound mail transport.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync + 'static {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::SendFailure`] on network or authentication
    /// failure, or [`MailError::InvalidAddress`] / [`MailError::Build`] if the
    /// message cannot be assembled.
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Caller-facing message parameters for [`Mailer::send_mail`].
#[derive(Debug, Clone, Default)]
pub struct SendMail {
    pub to: String,
    pub subject: String,
    /// Plain-text body. Derived from `html` when absent.
    pub text: Option<String>,
    pub html: Option<String>,
    pub reply_to: Option<String>,
    /// Sender override. Defaults to the configured sender.
    pub from: Option<String>,
}

/// Addresses and branding used when composing messages.
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Default sender mailbox.
    pub sender: Option<String>,
    /// Owner address that receives notifications and digests.
    pub owner: Option<String>,
    /// Display name used in message copy.
    pub brand: String,
}

/// Composes and dispatches the lead-flow messages through one transport.
pub struct Mailer {
    transport: Option<Arc<dyn MailTransport>>,
    settings: MailSettings,
}

impl Mailer {
    /// Create a dispatcher. A `None` transport means SMTP credentials are not
    /// configured; every send then fails with [`MailError::ConfigMissing`].
    #[must_use]
    pub fn new(transport: Option<Arc<dyn MailTransport>>, settings: MailSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// The settings this dispatcher composes with.
    #[must_use]
    pub fn settings(&self) -> &MailSettings {
        &self.settings
    }

    /// Dispatch one message through the shared transport.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ConfigMissing`] when credentials or the sender
    /// are not configured, [`MailError::MisconfiguredAddress`] when the
    /// configured sender does not parse, and whatever the transport returns
    /// on failure.
    pub async fn send_mail(&self, mail: SendMail) -> Result<(), MailError> {
        let transport = self.transport.as_ref().ok_or(MailError::ConfigMissing {
            what: "SMTP credentials",
        })?;
        let sender = self
            .settings
            .sender
            .as_deref()
            .ok_or(MailError::ConfigMissing {
                what: "sender address",
            })?;

        let text = match mail.text {
            Some(text) => text,
            None => mail.html.as_deref().map(strip_tags).unwrap_or_default(),
        };

        let from = match mail.from {
            Some(from) => from,
            None => configured_address("sender address", sender)?,
        };

        let outgoing = OutgoingMail {
            from,
            to: mail.to,
            reply_to: mail.reply_to,
            subject: mail.subject,
            text,
            html: mail.html,
        };

        transport.deliver(&outgoing).await.inspect_err(|e| {
            warn!(error = %e, subject = %outgoing.subject, "mail delivery failed");
        })
    }

    /// Tell the owner a new inquiry arrived. Replies go to the inquirer.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ConfigMissing`] without an owner address, plus
    /// any [`send_mail`](Self::send_mail) error.
    pub async fn notify_owner(&self, inquirer: &str) -> Result<(), MailError> {
        let owner = self.owner()?;
        let rendered = templates::inquiry_notification(inquirer, Utc::now());

        self.send_mail(SendMail {
            to: owner,
            subject: rendered.subject,
            text: Some(rendered.text),
            html: Some(rendered.html),
            reply_to: Some(inquirer.to_owned()),
            from: None,
        })
        .await?;

        info!("owner notified of new inquiry");
        Ok(())
    }

    /// Send the inquirer a link to the intake form carrying `token`.
    ///
    /// # Errors
    ///
    /// Any [`send_mail`](Self::send_mail) error.
    pub async fn auto_reply(&self, to: &str, token: &str, origin: &str) -> Result<(), MailError> {
        let link = intake_link(origin, to, token);
        let rendered = templates::auto_reply(&self.settings.brand, &link);

        self.send_mail(SendMail {
            to: to.to_owned(),
            subject: rendered.subject,
            text: Some(rendered.text),
            html: Some(rendered.html),
            reply_to: None,
            from: None,
        })
        .await
    }

    /// Forward an intake brief to the owner. Replies go to the submitter.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ConfigMissing`] without an owner address, plus
    /// any [`send_mail`](Self::send_mail) error.
    pub async fn send_intake_to_owner(&self, brief: &IntakeBrief) -> Result<(), MailError> {
        let owner = self.owner()?;
        let rendered = templates::intake_digest(brief);

        self.send_mail(SendMail {
            to: owner,
            subject: rendered.subject,
            text: Some(rendered.text),
            html: Some(rendered.html),
            reply_to: Some(brief.email.clone()),
            from: None,
        })
        .await?;

        info!("intake brief forwarded to owner");
        Ok(())
    }

    fn owner(&self) -> Result<String, MailError> {
        let owner = self
            .settings
            .owner
            .as_deref()
            .ok_or(MailError::ConfigMissing {
                what: "owner address",
            })?;
        configured_address("owner address", owner)
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("transport", &self.transport.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Build the intake form link: `{origin}/i?email={email}&t={token}`.
///
/// Both query values are percent-encoded; a trailing slash on `origin` is
/// dropped.
#[must_use]
pub fn intake_link(origin: &str, email: &str, token: &str) -> String {
    format!(
        "{}/i?email={}&t={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(email),
        urlencoding::encode(token),
    )
}

/// Parse a configured mailbox, reporting failure as a configuration fault.
fn configured_address(what: &'static str, address: &str) -> Result<String, MailError> {
    parse_mailbox(address).map_err(|e| MailError::MisconfiguredAddress {
        what,
        address: address.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(address.to_owned())
}

static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]+>").ok());

/// Crude HTML-to-text fallback: drop every tag.
fn strip_tags(html: &str) -> String {
    match TAG_RE.as_ref() {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_owned(),
    }
}
