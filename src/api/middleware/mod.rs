//! API middleware components

pub mod account_auth;
pub mod auth;
pub mod logging;

pub use account_auth::RequireAccount;
pub use auth::{api_key_gateway, AuthMethod, Principal};
pub use logging::logging_middleware;
