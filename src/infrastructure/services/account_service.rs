//! Account service
//!
//! Profile view and email re-verification for signed-in accounts.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::api_key::ApiKeyRepository;
use crate::domain::email::EmailSender;
use crate::domain::plan::{PlanPolicy, PlanTier};
use crate::domain::DomainError;
use crate::infrastructure::api_key::KeyCodec;
use crate::infrastructure::cooldown::{Cooldown, CooldownDecision};
use crate::infrastructure::deadline::with_deadline;
use crate::infrastructure::email::confirmation_email;

/// Account summary shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub account_id: AccountId,
    pub email: String,
    pub full_name: String,
    pub plan: PlanTier,
    pub plan_name: String,
    pub email_confirmed: bool,
    pub active_keys: u32,
    pub max_keys: u32,
    pub daily_request_limit: u64,
    pub per_minute_request_limit: u64,
    /// Always zero until request metering exists
    pub monthly_requests: u64,
}

/// Collaborators and settings for `AccountService`
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    pub verification_interval: Duration,
    pub operation_timeout: Duration,
    pub public_base_url: String,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            verification_interval: Duration::from_secs(120),
            operation_timeout: Duration::from_secs(5),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Account service
#[derive(Debug)]
pub struct AccountService<A, K>
where
    A: AccountRepository,
    K: ApiKeyRepository,
{
    accounts: Arc<A>,
    keys: Arc<K>,
    policy: Arc<PlanPolicy>,
    cooldown: Cooldown,
    email_sender: Arc<dyn EmailSender>,
    codec: KeyCodec,
    config: AccountServiceConfig,
}

impl<A: AccountRepository, K: ApiKeyRepository> AccountService<A, K> {
    pub fn new(
        accounts: Arc<A>,
        keys: Arc<K>,
        policy: Arc<PlanPolicy>,
        cooldown: Cooldown,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            accounts,
            keys,
            policy,
            cooldown,
            email_sender,
            codec: KeyCodec::default(),
            config: AccountServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AccountServiceConfig) -> Self {
        self.config = config;
        self
    }

    async fn require_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        with_deadline(self.config.operation_timeout, "load account", self.accounts.get(id))
            .await?
            .ok_or_else(|| DomainError::not_found("User not found."))
    }

    async fn save(&self, account: &Account) -> Result<Account, DomainError> {
        with_deadline(
            self.config.operation_timeout,
            "update account",
            self.accounts.update(account),
        )
        .await
    }

    /// Profile for the signed-in account
    pub async fn profile(&self, id: &AccountId) -> Result<AccountProfile, DomainError> {
        let account = self.require_account(id).await?;
        let active_keys = with_deadline(
            self.config.operation_timeout,
            "count api keys",
            self.keys.count_active(id),
        )
        .await?;
        let limits = self.policy.limits(account.plan());

        Ok(AccountProfile {
            account_id: account.id().clone(),
            email: account.email().to_string(),
            full_name: account.full_name(),
            plan: account.plan(),
            plan_name: limits.name.clone(),
            email_confirmed: account.email_confirmed(),
            active_keys,
            max_keys: limits.max_keys,
            daily_request_limit: limits.daily_request_limit,
            per_minute_request_limit: limits.per_minute_request_limit,
            monthly_requests: 0,
        })
    }

    /// Send a fresh confirmation email, at most once per cooldown interval
    pub async fn resend_confirmation(&self, id: &AccountId) -> Result<(), DomainError> {
        let mut account = self.require_account(id).await?;

        if account.email_confirmed() {
            return Err(DomainError::validation("Email is already confirmed."));
        }

        if let CooldownDecision::Denied { remaining } = self
            .cooldown
            .try_consume(id.as_str(), self.config.verification_interval)
        {
            info!(
                account_id = %id,
                remaining_secs = remaining.as_secs(),
                "Confirmation email throttled"
            );
            return Err(DomainError::rate_limited(remaining));
        }

        match self.issue_and_send(&mut account).await {
            Ok(()) => {
                info!(account_id = %id, transport = self.email_sender.name(), "Confirmation email sent");
                Ok(())
            }
            Err(e) => {
                // A failed attempt must not lock the account out for the whole interval
                self.cooldown.reset(id.as_str());
                error!(account_id = %id, error = %e, "Failed to send confirmation email");
                Err(e)
            }
        }
    }

    async fn issue_and_send(&self, account: &mut Account) -> Result<(), DomainError> {
        let token = self.codec.random_token();
        account.set_verification_token_hash(self.codec.hash(&token));
        self.save(account).await?;

        let url = format!(
            "{}/account/confirm-email?account={}&token={}",
            self.config.public_base_url.trim_end_matches('/'),
            account.id(),
            token
        );

        self.email_sender
            .send(confirmation_email(account, &url))
            .await
    }

    /// Confirm the account's email with a token from the confirmation link
    ///
    /// Confirming an already confirmed account succeeds.
    pub async fn confirm_email(&self, id: &AccountId, token: &str) -> Result<(), DomainError> {
        let mut account = self.require_account(id).await?;

        if account.email_confirmed() {
            return Ok(());
        }

        let valid = account
            .verification_token_hash()
            .is_some_and(|hash| self.codec.verify(token, hash));

        if !valid {
            info!(account_id = %id, "Rejected email confirmation token");
            return Err(DomainError::validation("Invalid or expired confirmation token."));
        }

        account.confirm_email();
        self.save(&account).await?;

        info!(account_id = %id, "Email confirmed");
        Ok(())
    }
}
