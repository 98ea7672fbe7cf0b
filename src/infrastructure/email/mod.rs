//! Email delivery implementations
//!
//! The transport is chosen once at startup from configuration.

mod http_sender;
mod log_sender;
mod template;

use std::sync::Arc;
use std::time::Duration;

pub use http_sender::HttpEmailSender;
pub use log_sender::LogEmailSender;
pub use template::confirmation_email;

use crate::config::{EmailConfig, EmailProvider};
use crate::domain::email::EmailSender;
use crate::domain::DomainError;

/// Build the configured email transport
pub fn create_email_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, DomainError> {
    match config.provider {
        EmailProvider::Log => Ok(Arc::new(LogEmailSender::new())),
        EmailProvider::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                DomainError::configuration("email.endpoint is required for the http provider")
            })?;

            let sender = HttpEmailSender::new(
                endpoint,
                config.from.clone(),
                config.from_name.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;

            Ok(Arc::new(match &config.api_key {
                Some(key) => sender.with_api_key(key.clone()),
                None => sender,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_log_sender() {
        let sender = create_email_sender(&EmailConfig::default()).unwrap();
        assert_eq!(sender.name(), "log");
    }

    #[test]
    fn test_http_requires_endpoint() {
        let config = EmailConfig {
            provider: EmailProvider::Http,
            ..Default::default()
        };

        let error = create_email_sender(&config).unwrap_err();
        assert!(matches!(error, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_http_sender_selected() {
        let config = EmailConfig {
            provider: EmailProvider::Http,
            endpoint: Some("http://localhost:9000/send".to_string()),
            ..Default::default()
        };

        let sender = create_email_sender(&config).unwrap();
        assert_eq!(sender.name(), "http");
    }
}
