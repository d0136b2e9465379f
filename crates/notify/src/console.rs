use async_trait::async_trait;
use dipwatch_core::notify::error::NotifyError;
use dipwatch_core::notify::port::Notifier;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// # Summary
/// Prints the report instead of sending it. Used when email delivery is not configured.
///
/// # Invariants
/// - Writes are serialised through the mutex, so concurrent reports never interleave.
pub struct ConsoleNotifier<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleNotifier<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(tokio::io::stdout())
    }
}

impl<W> ConsoleNotifier<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Notifier for ConsoleNotifier<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let text = format!("===== {} =====\n{}\n", subject, content.trim_end());
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| NotifyError::Platform(format!("Console write failed: {}", e)))?;
        out.flush()
            .await
            .map_err(|e| NotifyError::Platform(format!("Console flush failed: {}", e)))
    }
}
