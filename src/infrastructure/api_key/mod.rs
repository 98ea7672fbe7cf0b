//! API Key infrastructure implementations
//!
//! This module provides the credential codec, key storage, and the service
//! that ties them to plan limits.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{GeneratedApiKey, KeyCodec};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyListing, ApiKeyService, AuthenticatedKey, CreateApiKeyResult};
