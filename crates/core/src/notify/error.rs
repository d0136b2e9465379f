use thiserror::Error;

/// # Summary
/// Notification delivery errors.
///
/// # Invariants
/// - Derives `Error` through `thiserror`.
/// - Only `Network` is worth retrying; the other variants fail the same way every time.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Bad or missing channel settings (addresses, host)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The delivery channel rejected the message
    #[error("Platform error: {0}")]
    Platform(String),
}

impl NotifyError {
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Network(_))
    }
}
