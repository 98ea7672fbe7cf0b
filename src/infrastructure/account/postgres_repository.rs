//! PostgreSQL account repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::plan::PlanTier;
use crate::domain::DomainError;

/// PostgreSQL implementation of AccountRepository
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, plan, email_confirmed,
                   verification_token_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, first_name, last_name, plan, email_confirmed,
                                  verification_token_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.first_name())
        .bind(account.last_name())
        .bind(account.plan().as_str())
        .bind(account.email_confirmed())
        .bind(account.verification_token_hash())
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Account '{}' already exists", account.id()))
            } else {
                DomainError::storage(format!("Failed to create account: {}", e))
            }
        })?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, first_name = $3, last_name = $4, plan = $5,
                email_confirmed = $6, verification_token_hash = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.first_name())
        .bind(account.last_name())
        .bind(account.plan().as_str())
        .bind(account.email_confirmed())
        .bind(account.verification_token_hash())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, DomainError> {
    let id: String = row.get("id");
    let plan: String = row.get("plan");

    let id = AccountId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid account ID in database: {}", e)))?;

    Ok(Account::restore(
        id,
        row.get("email"),
        row.get("first_name"),
        row.get("last_name"),
        PlanTier::parse_lenient(&plan),
        row.get("email_confirmed"),
        row.get("verification_token_hash"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
