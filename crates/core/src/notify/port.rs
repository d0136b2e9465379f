use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// Delivery channel for the finished run report.
///
/// # Invariants
/// - Implementations are `Send + Sync`.
/// - Called once per run; implementations do not retry on their own.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// Sends a message with a subject line and a plain-text body.
    ///
    /// # Arguments
    /// * `subject` - Subject or title of the notification.
    /// * `content` - Plain-text body.
    ///
    /// # Returns
    /// * `Ok(())` once the channel accepted the message.
    /// * `Err(NotifyError)` otherwise.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;
}
