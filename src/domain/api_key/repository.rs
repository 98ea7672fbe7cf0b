//! API key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId};
use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Repository trait for API key storage
///
/// Every owner-scoped method treats a key owned by someone else exactly like
/// a missing key.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// List an owner's keys, newest first, including revoked ones
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<ApiKey>, DomainError>;

    /// Insert a key unless its owner already holds `max_active` active keys
    ///
    /// The count and the insert are atomic with respect to other inserts for
    /// the same owner. Returns `DomainError::LimitExceeded` when full; nothing
    /// is written in that case.
    async fn insert_within_limit(
        &self,
        api_key: ApiKey,
        max_active: u32,
    ) -> Result<ApiKey, DomainError>;

    /// Find the active key whose stored digest equals `secret_hash`
    async fn find_active_by_hash(&self, secret_hash: &str)
        -> Result<Option<ApiKey>, DomainError>;

    /// Mark a key inactive; returns false if it is missing or not owned
    async fn deactivate(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError>;

    /// Remove a key; returns false if it is missing or not owned
    async fn delete(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError>;

    /// Count an owner's active keys
    async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
