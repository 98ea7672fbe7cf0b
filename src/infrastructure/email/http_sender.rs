//! JSON-over-HTTP email transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::email::{EmailMessage, EmailSender};
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Posts each message as JSON to a delivery API
#[derive(Clone)]
pub struct HttpEmailSender {
    http_client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
    from_name: String,
}

impl std::fmt::Debug for HttpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailSender")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[hidden]"))
            .field("from", &self.from)
            .finish()
    }
}

impl HttpEmailSender {
    pub fn new(
        endpoint: impl Into<String>,
        from: impl Into<String>,
        from_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: None,
            from: from.into(),
            from_name: from_name.into(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let body = SendRequest {
            from: Address {
                email: &self.from,
                name: Some(&self.from_name),
            },
            to: vec![Address {
                email: &message.to,
                name: message.to_name.as_deref(),
            }],
            subject: &message.subject,
            html: &message.html_body,
            text: &message.text_body,
        };

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            warn!(to = %message.to, error = %reason, "Email delivery failed");
            DomainError::internal(format!("Email delivery failed: {}", reason))
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();
            warn!(
                to = %message.to,
                status = status.as_u16(),
                detail = %detail,
                "Email provider rejected message"
            );
            return Err(DomainError::internal(format!(
                "Email delivery failed with status {}",
                status.as_u16()
            )));
        }

        info!(to = %message.to, subject = %message.subject, "Email delivered");
        Ok(())
    }
}
