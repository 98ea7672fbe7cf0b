//! API key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ApiKeyValidationError;
use crate::domain::account::AccountId;

/// API key identifier, assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier supplied by a caller
    pub fn parse(value: &str) -> Result<Self, ApiKeyValidationError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ApiKeyValidationError::MalformedId)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ApiKeyId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key record
///
/// Holds only the digest of the secret. The plaintext exists solely in the
/// creation result and is never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    owner_id: AccountId,
    name: String,
    /// One-way digest of the secret
    #[serde(skip_serializing)]
    secret_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
    /// Reserved for usage tracking; never populated
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Create a new active API key
    pub fn new(
        id: ApiKeyId,
        owner_id: AccountId,
        name: impl Into<String>,
        secret_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            secret_hash: secret_hash.into(),
            active: true,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    /// Rebuild a key from persisted fields
    pub fn restore(
        id: ApiKeyId,
        owner_id: AccountId,
        name: String,
        secret_hash: String,
        active: bool,
        created_at: DateTime<Utc>,
        last_used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            secret_hash,
            active,
            created_at,
            last_used_at,
        }
    }

    // Getters

    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    /// Whether `owner` owns this key
    pub fn is_owned_by(&self, owner: &AccountId) -> bool {
        &self.owner_id == owner
    }

    // Mutators

    /// Deactivate the key; there is no way back
    pub fn revoke(&mut self) {
        self.active = false;
    }
}
