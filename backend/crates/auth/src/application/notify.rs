//! Notification Sender
//!
//! Out-of-band delivery of reset OTPs. The reset flow treats delivery
//! as fire-and-forget; failures are logged, never surfaced to the
//! requester.

use crate::error::AuthResult;

/// Notification sender trait
#[trait_variant::make(NotificationSender: Send)]
pub trait LocalNotificationSender {
    /// Deliver a message to the given address
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()>;
}

/// Development sender that writes the message to the log
///
/// Stands in for a mail gateway during development and tests.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl NotificationSender for TracingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()> {
        tracing::info!(to = %to, subject = %subject, body = %body, "Notification (log only)");
        Ok(())
    }
}
