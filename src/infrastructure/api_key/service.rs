//! API key service
//!
//! Credential lifecycle for account owners plus credential resolution for the
//! request gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::api_key::{validate_api_key_name, ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::plan::PlanPolicy;
use crate::domain::DomainError;
use crate::infrastructure::deadline::with_deadline;

use super::generator::KeyCodec;

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of creating a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The stored key (without the secret)
    pub api_key: ApiKey,
    /// The full credential; returned once and never again
    pub plain_text_once: String,
    /// Masked display form
    pub preview: String,
}

/// A key as shown in listings
#[derive(Debug, Clone)]
pub struct ApiKeyListing {
    pub api_key: ApiKey,
    pub preview: String,
}

/// A presented credential resolved to its key and owning account
#[derive(Debug, Clone)]
pub struct AuthenticatedKey {
    pub api_key: ApiKey,
    pub account: Account,
}

/// API key service for managing API keys
#[derive(Debug)]
pub struct ApiKeyService<K, A>
where
    K: ApiKeyRepository,
    A: AccountRepository,
{
    keys: Arc<K>,
    accounts: Arc<A>,
    policy: Arc<PlanPolicy>,
    codec: KeyCodec,
    operation_timeout: Duration,
}

impl<K: ApiKeyRepository, A: AccountRepository> ApiKeyService<K, A> {
    /// Create a new API key service
    pub fn new(keys: Arc<K>, accounts: Arc<A>, policy: Arc<PlanPolicy>) -> Self {
        Self {
            keys,
            accounts,
            policy,
            codec: KeyCodec::default(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Create with a custom codec
    pub fn with_codec(mut self, codec: KeyCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Bound every storage call by `timeout`
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        with_deadline(self.operation_timeout, operation, future).await
    }

    async fn require_account(&self, owner: &AccountId) -> Result<Account, DomainError> {
        self.bounded("load account", self.accounts.get(owner))
            .await?
            .ok_or_else(|| DomainError::not_found("User not found."))
    }

    /// List an owner's keys, newest first, including revoked ones
    pub async fn list(&self, owner: &AccountId) -> Result<Vec<ApiKeyListing>, DomainError> {
        let keys = self
            .bounded("list api keys", self.keys.list_by_owner(owner))
            .await?;

        Ok(keys
            .into_iter()
            .map(|api_key| ApiKeyListing {
                preview: self.codec.preview_from_hash(api_key.secret_hash()),
                api_key,
            })
            .collect())
    }

    /// Issue a new key for `owner` if their plan has room
    pub async fn create(
        &self,
        owner: &AccountId,
        name: &str,
    ) -> Result<CreateApiKeyResult, DomainError> {
        validate_api_key_name(name).map_err(|e| DomainError::validation(e.to_string()))?;

        let account = self.require_account(owner).await?;
        let limits = self.policy.limits(account.plan());

        let active = self
            .bounded("count api keys", self.keys.count_active(owner))
            .await?;
        if !self.policy.can_create_key(account.plan(), active) {
            info!(
                owner_id = %owner,
                plan = %account.plan(),
                active,
                max_keys = limits.max_keys,
                "API key limit reached"
            );
            return Err(DomainError::limit_exceeded(limits.max_keys));
        }

        let generated = self.codec.generate();
        let api_key = ApiKey::new(
            ApiKeyId::generate(),
            owner.clone(),
            name.trim(),
            generated.hash,
        );

        // The pre-check above is advisory; this insert is what holds the limit
        let created = self
            .bounded(
                "create api key",
                self.keys.insert_within_limit(api_key, limits.max_keys),
            )
            .await?;

        let preview = self.codec.preview_from_hash(created.secret_hash());
        info!(
            owner_id = %owner,
            key_id = %created.id(),
            preview = %preview,
            "API key created"
        );

        Ok(CreateApiKeyResult {
            api_key: created,
            plain_text_once: generated.key,
            preview,
        })
    }

    /// Deactivate one of the owner's keys
    ///
    /// Revoking an already revoked key succeeds.
    pub async fn revoke(&self, owner: &AccountId, id: ApiKeyId) -> Result<(), DomainError> {
        let revoked = self
            .bounded("revoke api key", self.keys.deactivate(owner, id))
            .await?;

        if !revoked {
            debug!(owner_id = %owner, key_id = %id, "Revoke target not found");
            return Err(DomainError::not_found("API key not found."));
        }

        info!(owner_id = %owner, key_id = %id, "API key revoked");
        Ok(())
    }

    /// Remove one of the owner's keys
    pub async fn delete(&self, owner: &AccountId, id: ApiKeyId) -> Result<(), DomainError> {
        let deleted = self
            .bounded("delete api key", self.keys.delete(owner, id))
            .await?;

        if !deleted {
            debug!(owner_id = %owner, key_id = %id, "Delete target not found");
            return Err(DomainError::not_found("API key not found."));
        }

        info!(owner_id = %owner, key_id = %id, "API key deleted");
        Ok(())
    }

    /// Number of active keys the owner holds
    pub async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError> {
        self.bounded("count api keys", self.keys.count_active(owner))
            .await
    }

    /// Resolve a presented credential
    ///
    /// Returns `None` for unknown, revoked or orphaned credentials; only
    /// storage faults are errors.
    pub async fn authenticate(
        &self,
        plain_text: &str,
    ) -> Result<Option<AuthenticatedKey>, DomainError> {
        let hash = self.codec.hash(plain_text);

        let Some(api_key) = self
            .bounded("look up api key", self.keys.find_active_by_hash(&hash))
            .await?
        else {
            debug!(preview = %self.codec.mask(plain_text), "Unknown API key presented");
            return Ok(None);
        };

        if !self.codec.verify(plain_text, api_key.secret_hash()) {
            debug!(key_id = %api_key.id(), "API key hash verification failed");
            return Ok(None);
        }

        let Some(account) = self
            .bounded("load account", self.accounts.get(api_key.owner_id()))
            .await?
        else {
            warn!(
                key_id = %api_key.id(),
                owner_id = %api_key.owner_id(),
                "Active API key has no owning account"
            );
            return Ok(None);
        };

        Ok(Some(AuthenticatedKey { api_key, account }))
    }

    /// Connectivity probe for readiness checks
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.bounded("ping key store", self.keys.ping()).await
    }
}
