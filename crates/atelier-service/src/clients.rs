//! Interfaces of the external providers the services call.

use atelier_core::domain::ImageRatio;
use atelier_core::{Interface, ResultValue};
use async_trait::async_trait;
use tracing::info;

/// Text-to-image provider.
#[async_trait]
pub trait ImageGenerator: Interface + Send + Sync {
    /// Generates `count` images for `prompt` and returns their URLs.
    async fn generate(&self, prompt: &str, ratio: ImageRatio, count: usize) -> ResultValue<Vec<String>>;
}

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub recipient: String,
    pub body: String,
    pub is_html: bool,
}

/// Transactional email provider.
#[async_trait]
pub trait EmailSender: Interface + Send + Sync {
    /// `true` once the provider accepted the message.
    async fn send(&self, message: EmailMessage) -> ResultValue<bool>;
}

/// Email sender for local development: logs the message instead of
/// delivering it.
#[derive(Debug, Clone)]
pub struct LoggingEmailSender {
    sender: String,
}

impl LoggingEmailSender {
    #[must_use]
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: EmailMessage) -> ResultValue<bool> {
        info!(
            from = %self.sender,
            to = %message.recipient,
            subject = %message.subject,
            "Email not delivered: logging sender in use"
        );
        ResultValue::success(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_sender_accepts_everything() {
        let sender = LoggingEmailSender::new("no-reply@example.com");
        let result = sender
            .send(EmailMessage {
                subject: "Hi".into(),
                recipient: "ada@example.com".into(),
                body: "<p>Hi</p>".into(),
                is_html: true,
            })
            .await;
        assert_eq!(result.value(), Some(&true));
    }
}
