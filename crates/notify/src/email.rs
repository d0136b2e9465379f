use async_trait::async_trait;
use dipwatch_core::config::SmtpSettings;
use dipwatch_core::notify::error::NotifyError;
use dipwatch_core::notify::port::Notifier;
use lettre::message::{Mailbox, Message, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

// Implicit TLS (SMTPS); every other port negotiates STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

/// # Summary
/// A notifier that sends the report as a plain-text email over authenticated SMTP.
///
/// # Invariants
/// - Sender and recipient addresses are validated once, at construction.
/// - The `AsyncSmtpTransport` is reused for every notification.
pub struct EmailNotifier {
    /// The asynchronous SMTP transport.
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// # Summary
    /// Creates a new `EmailNotifier` from complete SMTP settings.
    ///
    /// # Logic
    /// 1. Parses the sender and recipient mailboxes.
    /// 2. Port 465 uses an implicit TLS relay; any other port uses STARTTLS on that port.
    /// 3. Attaches the login credentials.
    ///
    /// # Arguments
    /// * `settings` - Host, port, login and addresses.
    ///
    /// # Returns
    /// * A new instance of `EmailNotifier` or `NotifyError::Config`.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = settings
            .to
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid to address: {}", e)))?;

        let relay = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map(|b| b.port(settings.port))
        };
        let builder =
            relay.map_err(|e| NotifyError::Config(format!("Invalid SMTP host: {}", e)))?;

        let creds = Credentials::new(settings.user.clone(), settings.pass.clone());
        let mailer = builder.credentials(creds).build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    /// # Summary
    /// Sends a notification email.
    ///
    /// # Logic
    /// 1. Builds a plain-text message with the subject and content.
    /// 2. Sends it through the configured transport.
    /// 3. A permanent SMTP rejection maps to `Platform`, anything else to `Network`.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| NotifyError::Platform(format!("Failed to build email: {}", e)))?;

        self.mailer.send(email).await.map_err(|e| {
            if e.is_permanent() {
                NotifyError::Platform(format!("SMTP rejected message: {}", e))
            } else {
                NotifyError::Network(format!("SMTP error: {}", e))
            }
        })?;

        debug!(to = %self.to, "Email sent");
        Ok(())
    }
}
