//! Account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_account_id, validate_email, AccountValidationError};
use crate::domain::plan::PlanTier;

/// Account identifier as issued by the identity system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, AccountValidationError> {
        let id = id.into();
        validate_account_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account owning API keys
///
/// The identity system owns credentials and sign-in; this record carries
/// only what key governance and email verification need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    email: String,
    first_name: String,
    last_name: String,
    plan: PlanTier,
    email_confirmed: bool,
    /// Hash of the outstanding email verification token
    #[serde(skip_serializing)]
    verification_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account on the free plan
    pub fn new(id: AccountId, email: impl Into<String>) -> Result<Self, AccountValidationError> {
        let email = email.into();
        validate_email(&email)?;
        let now = Utc::now();

        Ok(Self {
            id,
            email,
            first_name: String::new(),
            last_name: String::new(),
            plan: PlanTier::Free,
            email_confirmed: false,
            verification_token_hash: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild an account from persisted fields
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AccountId,
        email: String,
        first_name: String,
        last_name: String,
        plan: PlanTier,
        email_confirmed: bool,
        verification_token_hash: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            plan,
            email_confirmed,
            verification_token_hash,
            created_at,
            updated_at,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_plan(mut self, plan: PlanTier) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_email_confirmed(mut self, confirmed: bool) -> Self {
        self.email_confirmed = confirmed;
        self
    }

    // Getters

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn plan(&self) -> PlanTier {
        self.plan
    }

    pub fn email_confirmed(&self) -> bool {
        self.email_confirmed
    }

    pub fn verification_token_hash(&self) -> Option<&str> {
        self.verification_token_hash.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the outstanding verification token
    pub fn set_verification_token_hash(&mut self, hash: impl Into<String>) {
        self.verification_token_hash = Some(hash.into());
        self.touch();
    }

    /// Mark the email confirmed and drop the outstanding token
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.verification_token_hash = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_account() -> Account {
        Account::new(AccountId::new("user1").unwrap(), "fan@example.com").unwrap()
    }

    #[test]
    fn test_new_account_defaults() {
        let account = create_test_account();

        assert_eq!(account.plan(), PlanTier::Free);
        assert!(!account.email_confirmed());
        assert!(account.verification_token_hash().is_none());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = Account::new(AccountId::new("user1").unwrap(), "not-an-email");
        assert_eq!(result.unwrap_err(), AccountValidationError::InvalidEmail);
    }

    #[test]
    fn test_full_name_trims() {
        let account = create_test_account().with_name("Lionel", "");
        assert_eq!(account.full_name(), "Lionel");
    }

    #[test]
    fn test_confirm_email_clears_token() {
        let mut account = create_test_account();
        account.set_verification_token_hash("sha256$abc");

        account.confirm_email();

        assert!(account.email_confirmed());
        assert!(account.verification_token_hash().is_none());
    }

    #[test]
    fn test_serialization_hides_token_hash() {
        let mut account = create_test_account();
        account.set_verification_token_hash("sha256$secret-token-hash");

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-token-hash"));
    }

    #[test]
    fn test_account_id_roundtrip_through_serde() {
        let id: AccountId = serde_json::from_str("\"user-42\"").unwrap();
        assert_eq!(id.as_str(), "user-42");

        let bad: Result<AccountId, _> = serde_json::from_str("\"bad id\"");
        assert!(bad.is_err());
    }
}
