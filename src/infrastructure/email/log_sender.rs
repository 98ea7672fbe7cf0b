use async_trait::async_trait;
use tracing::info;

use crate::domain::email::{EmailMessage, EmailSender};
use crate::domain::DomainError;

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "Email not delivered (log transport)"
        );
        Ok(())
    }
}
