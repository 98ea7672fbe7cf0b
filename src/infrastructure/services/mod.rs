//! Infrastructure services

mod account_service;

pub use account_service::{AccountProfile, AccountService, AccountServiceConfig};
