//! In-memory mail transport for testing.
//!
//! Records every delivered message behind a `RwLock` instead of talking to
//! an SMTP server. It can be switched into a failing mode to exercise the
//! dispatcher's error paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::{MailTransport, OutgoingMail};
use crate::error::MailError;

/// A mail transport that keeps delivered messages in memory.
///
/// Clones share the same outbox, so a test can hand one clone to the
/// dispatcher and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<RwLock<Vec<OutgoingMail>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryTransport {
    /// Create an empty transport that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that rejects every message.
    #[must_use]
    pub fn failing() -> Self {
        let transport = Self::new();
        transport.set_failing(true);
        transport
    }

    /// Switch failure mode on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every message delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox.read().await.clone()
    }

    /// Messages delivered to `recipient`.
    pub async fn sent_to(&self, recipient: &str) -> Vec<OutgoingMail> {
        self.outbox
            .read()
            .await
            .iter()
            .filter(|m| m.to == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl MailTransport for MemoryTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::SendFailure {
                reason: "memory transport is in failing mode".to_owned(),
            });
        }
        self.outbox.write().await.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            from: "Voro <owner@voro.ink>".to_owned(),
            to: to.to_owned(),
            reply_to: None,
            subject: "hi".to_owned(),
            text: "hello".to_owned(),
            html: None,
        }
    }

    #[tokio::test]
    async fn records_in_order() {
        let transport = MemoryTransport::new();
        transport.deliver(&mail("a@b.com")).await.unwrap();
        transport.deliver(&mail("c@d.com")).await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(transport.sent_to("c@d.com").await.len(), 1);
    }

    #[tokio::test]
    async fn failing_mode_rejects_and_records_nothing() {
        let transport = MemoryTransport::failing();
        let result = transport.deliver(&mail("a@b.com")).await;
        assert!(matches!(result, Err(MailError::SendFailure { .. })));
        assert!(transport.sent().await.is_empty());

        transport.set_failing(false);
        transport.deliver(&mail("a@b.com")).await.unwrap();
        assert_eq!(transport.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_outbox() {
        let transport = MemoryTransport::new();
        let clone = transport.clone();
        clone.deliver(&mail("a@b.com")).await.unwrap();
        assert_eq!(transport.sent().await.len(), 1);
    }
}
