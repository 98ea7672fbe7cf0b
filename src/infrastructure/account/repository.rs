//! In-memory account repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::DomainError;

/// In-memory implementation of AccountRepository
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(account.id()) {
            return Err(DomainError::conflict(format!(
                "Account '{}' already exists",
                account.id()
            )));
        }

        if accounts
            .values()
            .any(|a| a.email().eq_ignore_ascii_case(account.email()))
        {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                account.email()
            )));
        }

        accounts.insert(account.id().clone(), account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        match accounts.get_mut(account.id()) {
            Some(existing) => {
                *existing = account.clone();
                Ok(account.clone())
            }
            None => Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::PlanTier;

    fn create_test_account(id: &str, email: &str) -> Account {
        Account::new(AccountId::new(id).unwrap(), email).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryAccountRepository::new();
        let account = create_test_account("user1", "a@example.com").with_plan(PlanTier::Pro);

        repo.create(account).await.unwrap();

        let found = repo.get(&AccountId::new("user1").unwrap()).await.unwrap();
        assert_eq!(found.unwrap().plan(), PlanTier::Pro);
        assert!(repo.exists(&AccountId::new("user1").unwrap()).await.unwrap());
        assert!(!repo.exists(&AccountId::new("user2").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryAccountRepository::new();
        repo.create(create_test_account("user1", "a@example.com"))
            .await
            .unwrap();

        let result = repo
            .create(create_test_account("user2", "A@Example.com"))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryAccountRepository::new();
        let mut account = create_test_account("user1", "a@example.com");
        repo.create(account.clone()).await.unwrap();

        account.confirm_email();
        repo.update(&account).await.unwrap();

        let found = repo.get(account.id()).await.unwrap().unwrap();
        assert!(found.email_confirmed());
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = InMemoryAccountRepository::new();
        let result = repo
            .update(&create_test_account("ghost", "g@example.com"))
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
