//! Email domain
//!
//! Outbound email is an external collaborator. The core only renders messages
//! and hands them to whichever `EmailSender` was chosen at startup.

mod message;
mod sender;

pub use message::EmailMessage;
pub use sender::EmailSender;

#[cfg(test)]
pub use sender::MockEmailSender;
