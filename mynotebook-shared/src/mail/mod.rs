/// Outgoing mail
///
/// Account flows send two kinds of mail: the verification link after
/// registration (and again whenever an unverified account logs in or asks
/// for a reset) and the password-reset link. Handlers only see the
/// [`Mailer`] trait; the transport is picked at startup.
///
/// # Transports
///
/// - [`http::HttpMailer`]: JSON over HTTPS to a transactional-mail API
/// - [`LogMailer`]: writes the message to the log and drops it
///
/// # Example
///
/// ```
/// use mynotebook_shared::mail::{templates, EmailMessage, LogMailer, Mailer};
///
/// # async fn example() -> Result<(), mynotebook_shared::mail::MailError> {
/// let mailer = LogMailer;
/// let message = templates::verification_email(
///     "ada@example.com",
///     "Ada",
///     "http://localhost:8080/auth/user/verify-email?token=abc",
/// );
/// mailer.send(message).await?;
/// # Ok(())
/// # }
/// ```

pub mod http;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,

    pub subject: String,

    /// HTML body
    pub html: String,
}

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport misconfigured (bad endpoint, missing key)
    #[error("Mail transport misconfigured: {0}")]
    Config(String),

    /// Request never got a response
    #[error("Failed to reach mail service: {0}")]
    Transport(String),

    /// Mail service answered with a non-success status
    #[error("Mail service rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers rendered messages
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Mailer that only logs
///
/// Selected when no mail API is configured. The log line includes the link
/// so a developer can follow it by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html,
            "Mail delivery disabled, message logged only"
        );
        Ok(())
    }
}
