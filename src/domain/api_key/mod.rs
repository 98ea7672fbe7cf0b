//! API Key domain
//!
//! This module provides domain types and the storage contract for the API
//! keys accounts use to call the public data API.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId};
pub use repository::ApiKeyRepository;
pub use validation::{validate_api_key_name, ApiKeyValidationError};
