use crate::domain::account::Account;
use crate::domain::email::EmailMessage;

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the email-confirmation message for `account`
pub fn confirmation_email(account: &Account, confirm_url: &str) -> EmailMessage {
    let greeting = match account.full_name() {
        name if name.is_empty() => "Hello".to_string(),
        name => format!("Hello {}", name),
    };

    let html = format!(
        "<p>{}</p>\
         <p>Please confirm your email address for the World Cup API by following this link:</p>\
         <p><a href=\"{url}\">{url}</a></p>\
         <p>If you did not request this, you can ignore this message.</p>",
        escape_html(&greeting),
        url = escape_html(confirm_url),
    );

    let text = format!(
        "{},\n\nPlease confirm your email address for the World Cup API:\n{}\n\n\
         If you did not request this, you can ignore this message.\n",
        greeting, confirm_url
    );

    EmailMessage::new(account.email(), "Confirm your email", html, text)
        .with_to_name(account.full_name())
}
