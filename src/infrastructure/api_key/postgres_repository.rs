//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::AccountId;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str =
    "SELECT id, owner_id, name, secret_hash, active, created_at, last_used_at FROM api_keys";

/// PostgreSQL implementation of ApiKeyRepository
///
/// Inserts lock the owning account row, so concurrent inserts for one owner
/// queue behind each other while other owners proceed.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at DESC, id",
            SELECT_COLUMNS
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn insert_within_limit(
        &self,
        api_key: ApiKey,
        max_active: u32,
    ) -> Result<ApiKey, DomainError> {
        // Rolled back on drop, including when the caller's future is cancelled
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let locked = sqlx::query("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(api_key.owner_id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to lock account: {}", e)))?;

        if locked.is_none() {
            return Err(DomainError::not_found("User not found."));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM api_keys WHERE owner_id = $1 AND active = TRUE",
        )
        .bind(api_key.owner_id().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        if active >= i64::from(max_active) {
            return Err(DomainError::limit_exceeded(max_active));
        }

        sqlx::query(
            r#"
            INSERT INTO api_keys (id, owner_id, name, secret_hash, active, created_at, last_used_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(api_key.id().as_uuid())
        .bind(api_key.owner_id().as_str())
        .bind(api_key.name())
        .bind(api_key.secret_hash())
        .bind(api_key.is_active())
        .bind(api_key.created_at())
        .bind(api_key.last_used_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("API key '{}' already exists", api_key.id()))
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit API key: {}", e)))?;

        Ok(api_key)
    }

    async fn find_active_by_hash(
        &self,
        secret_hash: &str,
    ) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE secret_hash = $1 AND active = TRUE",
            SELECT_COLUMNS
        ))
        .bind(secret_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn deactivate(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE api_keys SET active = FALSE WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to revoke API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, owner: &AccountId, id: ApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self, owner: &AccountId) -> Result<u32, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM api_keys WHERE owner_id = $1 AND active = TRUE",
        )
        .bind(owner.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        Ok(count as u32)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database ping failed: {}", e)))?;

        Ok(())
    }
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> Result<ApiKey, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let owner_id: String = row.get("owner_id");
    let name: String = row.get("name");
    let secret_hash: String = row.get("secret_hash");
    let active: bool = row.get("active");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let last_used_at: Option<chrono::DateTime<chrono::Utc>> = row.get("last_used_at");

    let owner_id = AccountId::new(owner_id)
        .map_err(|e| DomainError::storage(format!("Invalid owner ID in database: {}", e)))?;

    Ok(ApiKey::restore(
        ApiKeyId::from(id),
        owner_id,
        name,
        secret_hash,
        active,
        created_at,
        last_used_at,
    ))
}
