/// HTTP mail transport
///
/// Posts each message as JSON to a transactional-mail endpoint
/// (Resend-compatible):
///
/// ```text
/// POST {endpoint}
/// Authorization: Bearer {api_key}
/// Content-Type: application/json
///
/// { "from": "...", "to": ["..."], "subject": "...", "html": "..." }
/// ```
///
/// Any 2xx response counts as accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{EmailMessage, MailError, Mailer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by a transactional-mail HTTP API
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: reqwest::Url,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Builds a mailer for `endpoint`, sending as `from`
    ///
    /// # Errors
    ///
    /// Returns `MailError::Config` if the endpoint isn't an absolute http(s)
    /// URL, the key is empty, or the HTTP client can't be built.
    pub fn new(endpoint: &str, api_key: &str, from: &str) -> Result<Self, MailError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| MailError::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(MailError::Config(format!(
                "unsupported endpoint scheme {:?}",
                endpoint.scheme()
            )));
        }
        if api_key.trim().is_empty() {
            return Err(MailError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("mynotebook/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn payload<'a>(&'a self, message: &'a EmailMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        debug!(to = %message.to, subject = %message.subject, "Sending mail");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&self.payload(&message))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, status = status.as_u16(), "Mail accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(to = %message.to, status = status.as_u16(), "Mail service rejected message");
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "ada@example.com".to_string(),
            subject: "mynotebook - verify your email".to_string(),
            html: "<a href=\"x\">Verify</a>".to_string(),
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            HttpMailer::new("not a url", "key", "from@example.com"),
            Err(MailError::Config(_))
        ));
        assert!(matches!(
            HttpMailer::new("ftp://mail.example.com", "key", "from@example.com"),
            Err(MailError::Config(_))
        ));
        assert!(matches!(
            HttpMailer::new("https://api.example.com/emails", " ", "from@example.com"),
            Err(MailError::Config(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let mailer = HttpMailer::new(
            "https://api.example.com/emails",
            "re_test_key",
            "My Notebook <noreply@example.com>",
        )
        .unwrap();
        assert_eq!(mailer.endpoint(), "https://api.example.com/emails");

        let message = message();
        let json = serde_json::to_value(mailer.payload(&message)).unwrap();

        assert_eq!(json["from"], "My Notebook <noreply@example.com>");
        assert_eq!(json["to"], serde_json::json!(["ada@example.com"]));
        assert_eq!(json["subject"], "mynotebook - verify your email");
        assert_eq!(json["html"], "<a href=\"x\">Verify</a>");
    }

    #[tokio::test]
    async fn test_send_unreachable_endpoint() {
        // Port 1 on loopback refuses connections
        let mailer = HttpMailer::new("http://127.0.0.1:1/emails", "key", "from@example.com").unwrap();

        assert!(matches!(
            mailer.send(message()).await,
            Err(MailError::Transport(_))
        ));
    }
}
