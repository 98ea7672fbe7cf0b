//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::account::AccountId;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct KeyTable {
    keys: HashMap<ApiKeyId, ApiKey>,
    by_hash: HashMap<String, ApiKeyId>,
}

impl KeyTable {
    fn owned(&self, owner: &AccountId, id: ApiKeyId) -> Option<&ApiKey> {
        self.keys.get(&id).filter(|key| key.is_owned_by(owner))
    }

    fn count_active(&self, owner: &AccountId) -> u32 {
        self.keys
            .values()
            .filter(|key| key.is_owned_by(owner) && key.is_active())
            .count() as u32
    }
}

/// In-memory implementation of ApiKeyRepository
///
/// The active-key count check and the insert happen under one write guard,
/// so the count cannot change in between.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    table: RwLock<KeyTable>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<ApiKey>, DomainError> {
        let table = self.table.read().await;

        let mut keys: Vec<ApiKey> = table
            .keys
            .values()
            .filter(|key| key.is_owned_by(owner))
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(keys)
    }

    async fn insert_within_limit(
        &self,
        api_key: ApiKey,
        max_active: u32,
    ) -> Result<ApiKey, DomainError> {
        let mut table = self.table.write().await;

        if table.count_active(api_key.owner_id()) >= max_active {
            return Err(DomainError::limit_exceeded(max_active));
        }

        if table.keys.contains_key(&api_key.id())
            || table.by_hash.contains_key(api_key.secret_hash())
        {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                api_key.id()
            )));
        }

        table
            .by_hash
            .insert(api_key.secret_hash().to_string(), api_key.id());
        table.keys.insert(api_key.id(), api_key.clone());

        Ok(api_key)
    }

    async fn find_active_by_hash(
        &self,
        secret_hash: &str,
    ) -> Result<Option<ApiKey>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .by_hash
            .get(secret_hash)
            .and_then(|id| table.keys.get(id))
            .filter(|key| key.is_active())
            .cloned())
    }

    async fn deactivate(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.keys.get_mut(&id).filter(|key| key.is_owned_by(owner)) {
            Some(key) => {
                key.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        if table.owned(owner, id).is_none() {
            return Ok(false);
        }

        if let Some(key) = table.keys.remove(&id) {
            table.by_hash.remove(key.secret_hash());
        }

        Ok(true)
    }

    async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError> {
        let table = self.table.read().await;
        Ok(table.count_active(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    fn owner(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    fn create_test_key(owner_id: &str, hash: &str) -> ApiKey {
        ApiKey::new(ApiKeyId::generate(), owner(owner_id), "Test Key", hash)
    }

    #[tokio::test]
    async fn test_insert_and_find_by_hash() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("user1", "sha256$one");

        repo.insert_within_limit(key.clone(), 1).await.unwrap();

        let found = repo.find_active_by_hash("sha256$one").await.unwrap();
        assert_eq!(found.unwrap().id(), key.id());
        assert!(repo.find_active_by_hash("sha256$two").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_respects_limit() {
        let repo = InMemoryApiKeyRepository::new();

        repo.insert_within_limit(create_test_key("user1", "sha256$a"), 1)
            .await
            .unwrap();
        let result = repo
            .insert_within_limit(create_test_key("user1", "sha256$b"), 1)
            .await;

        assert!(matches!(result, Err(DomainError::LimitExceeded { limit: 1 })));
        assert_eq!(repo.list_by_owner(&owner("user1")).await.unwrap().len(), 1);
        assert!(repo.find_active_by_hash("sha256$b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_limit_is_per_owner() {
        let repo = InMemoryApiKeyRepository::new();

        repo.insert_within_limit(create_test_key("user1", "sha256$a"), 1)
            .await
            .unwrap();
        repo.insert_within_limit(create_test_key("user2", "sha256$b"), 1)
            .await
            .unwrap();

        assert_eq!(repo.count_active(&owner("user1")).await.unwrap(), 1);
        assert_eq!(repo.count_active(&owner("user2")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_frees_slot_and_hides_from_lookup() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("user1", "sha256$a");
        repo.insert_within_limit(key.clone(), 1).await.unwrap();

        assert!(repo.deactivate(&owner("user1"), key.id()).await.unwrap());

        assert_eq!(repo.count_active(&owner("user1")).await.unwrap(), 0);
        assert!(repo.find_active_by_hash("sha256$a").await.unwrap().is_none());
        assert_eq!(repo.list_by_owner(&owner("user1")).await.unwrap().len(), 1);

        repo.insert_within_limit(create_test_key("user1", "sha256$b"), 1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_foreign_owner_cannot_touch_key() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("user1", "sha256$a");
        repo.insert_within_limit(key.clone(), 1).await.unwrap();

        assert!(!repo.deactivate(&owner("user2"), key.id()).await.unwrap());
        assert!(!repo.delete(&owner("user2"), key.id()).await.unwrap());
        assert!(repo.list_by_owner(&owner("user2")).await.unwrap().is_empty());
        assert_eq!(repo.count_active(&owner("user1")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_hash_index() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("user1", "sha256$a");
        repo.insert_within_limit(key.clone(), 1).await.unwrap();

        assert!(repo.delete(&owner("user1"), key.id()).await.unwrap());
        assert!(!repo.delete(&owner("user1"), key.id()).await.unwrap());

        assert!(repo.find_active_by_hash("sha256$a").await.unwrap().is_none());
        assert!(repo.list_by_owner(&owner("user1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = InMemoryApiKeyRepository::new();
        let first = create_test_key("user1", "sha256$a");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = create_test_key("user1", "sha256$b");

        repo.insert_within_limit(first.clone(), 5).await.unwrap();
        repo.insert_within_limit(second.clone(), 5).await.unwrap();

        let listed = repo.list_by_owner(&owner("user1")).await.unwrap();
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_never_exceed_limit() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());

        let attempts = (0..50).map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.insert_within_limit(create_test_key("user1", &format!("sha256${i}")), 3)
                    .await
            })
        });

        let results = join_all(attempts).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        assert_eq!(successes, 3);
        assert_eq!(repo.count_active(&owner("user1")).await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_across_owners() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());

        let attempts = (0..60).map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                let key = create_test_key(&format!("user{}", i % 6), &format!("sha256${i}"));
                repo.insert_within_limit(key, 2).await
            })
        });
        join_all(attempts).await;

        for n in 0..6 {
            let account = owner(&format!("user{n}"));
            assert_eq!(repo.count_active(&account).await.unwrap(), 2);
        }
    }
}
