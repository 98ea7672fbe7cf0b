//! Email message value

use serde::Serialize;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
        }
    }

    pub fn with_to_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.to_name = (!name.trim().is_empty()).then_some(name);
        self
    }
}
