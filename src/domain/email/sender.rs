//! Email sender trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::EmailMessage;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Delivers rendered email through some transport
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailSender: Send + Sync + Debug {
    /// Short transport name used in logs
    fn name(&self) -> &'static str;

    /// Deliver one message
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError>;
}
