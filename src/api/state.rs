//! Application state for shared services

use std::sync::Arc;

use crate::domain::account::{AccountId, AccountRepository};
use crate::domain::api_key::{ApiKeyId, ApiKeyRepository};
use crate::domain::plan::PlanPolicy;
use crate::domain::usage_meter::UsageMeter;
use crate::domain::DomainError;
use crate::infrastructure::api_key::{
    ApiKeyListing, ApiKeyService, AuthenticatedKey, CreateApiKeyResult,
};
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::services::{AccountProfile, AccountService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub plan_policy: Arc<PlanPolicy>,
    pub usage_meter: Arc<dyn UsageMeter>,
    pub jwt_service: Arc<JwtService>,
    pub gateway: GatewaySettings,
}

/// Gateway behaviour that comes from configuration
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    /// Path prefixes that bypass API key authentication
    pub exempt_prefixes: Vec<String>,
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn list(&self, owner: &AccountId) -> Result<Vec<ApiKeyListing>, DomainError>;
    async fn create(&self, owner: &AccountId, name: &str)
        -> Result<CreateApiKeyResult, DomainError>;
    async fn revoke(&self, owner: &AccountId, id: &str) -> Result<(), DomainError>;
    async fn delete(&self, owner: &AccountId, id: &str) -> Result<(), DomainError>;
    async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError>;
    async fn authenticate(&self, plain_text: &str)
        -> Result<Option<AuthenticatedKey>, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Trait for account service operations
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn profile(&self, id: &AccountId) -> Result<AccountProfile, DomainError>;
    async fn resend_confirmation(&self, id: &AccountId) -> Result<(), DomainError>;
    async fn confirm_email(&self, id: &AccountId, token: &str) -> Result<(), DomainError>;
}

fn parse_key_id(id: &str) -> Result<ApiKeyId, DomainError> {
    ApiKeyId::parse(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

#[async_trait::async_trait]
impl<K, A> ApiKeyServiceTrait for ApiKeyService<K, A>
where
    K: ApiKeyRepository + 'static,
    A: AccountRepository + 'static,
{
    async fn list(&self, owner: &AccountId) -> Result<Vec<ApiKeyListing>, DomainError> {
        ApiKeyService::list(self, owner).await
    }

    async fn create(
        &self,
        owner: &AccountId,
        name: &str,
    ) -> Result<CreateApiKeyResult, DomainError> {
        ApiKeyService::create(self, owner, name).await
    }

    async fn revoke(&self, owner: &AccountId, id: &str) -> Result<(), DomainError> {
        ApiKeyService::revoke(self, owner, parse_key_id(id)?).await
    }

    async fn delete(&self, owner: &AccountId, id: &str) -> Result<(), DomainError> {
        ApiKeyService::delete(self, owner, parse_key_id(id)?).await
    }

    async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError> {
        ApiKeyService::count_active(self, owner).await
    }

    async fn authenticate(
        &self,
        plain_text: &str,
    ) -> Result<Option<AuthenticatedKey>, DomainError> {
        ApiKeyService::authenticate(self, plain_text).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        ApiKeyService::ping(self).await
    }
}

#[async_trait::async_trait]
impl<A, K> AccountServiceTrait for AccountService<A, K>
where
    A: AccountRepository + 'static,
    K: ApiKeyRepository + 'static,
{
    async fn profile(&self, id: &AccountId) -> Result<AccountProfile, DomainError> {
        AccountService::profile(self, id).await
    }

    async fn resend_confirmation(&self, id: &AccountId) -> Result<(), DomainError> {
        AccountService::resend_confirmation(self, id).await
    }

    async fn confirm_email(&self, id: &AccountId, token: &str) -> Result<(), DomainError> {
        AccountService::confirm_email(self, id, token).await
    }
}
