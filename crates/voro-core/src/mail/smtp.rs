//! SMTP mail transport backed by `lettre`.
//!
//! One pooled async transport is built per process. Port 587 negotiates
//! STARTTLS; any other port uses implicit TLS (the Gmail default is
//! `smtp.gmail.com:465`).

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{MailTransport, OutgoingMail};
use crate::error::MailError;

/// Submission port that upgrades with STARTTLS.
const STARTTLS_PORT: u16 = 587;

/// Connection settings for the outbound SMTP identity.
#[derive(Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Account user name.
    pub username: String,
    /// Account password or app password.
    pub password: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Mail transport that relays through an authenticated SMTP server.
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::SendFailure`] if the TLS parameters for `host`
    /// cannot be constructed.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.port == STARTTLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        }
        .map_err(|e| MailError::SendFailure {
            reason: format!("failed to configure SMTP relay {}: {e}", settings.host),
        })?;

        let inner = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { inner })
    }
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpTransport").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        let response = self
            .inner
            .send(message)
            .await
            .map_err(|e| MailError::SendFailure {
                reason: e.to_string(),
            })?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

/// Parse a mailbox such as `Voro <hello@voro.ink>` or `hello@voro.ink`.
///
/// # Errors
///
/// Returns [`MailError::InvalidAddress`] if the string does not parse.
pub fn parse_mailbox(value: &str) -> Result<Mailbox, MailError> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidAddress {
            address: value.to_owned(),
            reason: e.to_string(),
        })
}

/// Assemble a MIME message: `multipart/alternative` when HTML is present,
/// plain text otherwise.
fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.clone());

    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    let built = match &mail.html {
        Some(html) => {
            builder.multipart(MultiPart::alternative_plain_html(mail.text.clone(), html.clone()))
        }
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text.clone()),
    };

    built.map_err(|e| MailError::Build {
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "Voro <owner@voro.ink>".to_owned(),
            to: "a@b.com".to_owned(),
            reply_to: Some("c@d.com".to_owned()),
            subject: "Hello".to_owned(),
            text: "plain body".to_owned(),
            html: Some("<p>html body</p>".to_owned()),
        }
    }

    #[test]
    fn parses_named_and_bare_mailboxes() {
        let named = parse_mailbox("Voro <owner@voro.ink>").unwrap();
        assert_eq!(named.email.to_string(), "owner@voro.ink");
        assert_eq!(named.name.as_deref(), Some("Voro"));

        let bare = parse_mailbox(" a@b.com ").unwrap();
        assert_eq!(bare.email.to_string(), "a@b.com");
    }

    #[test]
    fn rejects_garbage_mailbox() {
        assert!(matches!(
            parse_mailbox("not an address"),
            Err(MailError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn builds_alternative_message_with_reply_to() {
        let message = build_message(&mail()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Reply-To: c@d.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("plain body"));
        assert!(raw.contains("html body"));
    }

    #[test]
    fn builds_plain_message_without_html() {
        let mut plain = mail();
        plain.html = None;
        plain.reply_to = None;
        let message = build_message(&plain).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(!raw.contains("multipart"));
        assert!(!raw.contains("Reply-To"));
        assert!(raw.contains("plain body"));
    }

    #[test]
    fn smtp_settings_debug_redacts_password() {
        let settings = SmtpSettings {
            host: "smtp.gmail.com".to_owned(),
            port: 465,
            username: "owner@voro.ink".to_owned(),
            password: "hunter2".to_owned(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[redacted]"));
    }
}
