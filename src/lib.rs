//! World Cup API identity service
//!
//! Issues and revokes API keys for account owners, enforces per-plan key
//! quotas, rate-limits verification emails, and authenticates requests to
//! the public data API.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, GatewaySettings};
use crate::config::{AuthConfig, StorageBackend};
use domain::{
    Account, AccountId, AccountRepository, ApiKeyRepository, EmailSender, NoopUsageMeter,
    PlanPolicy, PlanTier,
};
use infrastructure::{
    account::{InMemoryAccountRepository, PostgresAccountRepository},
    api_key::{ApiKeyService, InMemoryApiKeyRepository, KeyCodec, PostgresApiKeyRepository},
    auth::{JwtConfig, JwtService},
    cooldown::Cooldown,
    email::create_email_sender,
    services::{AccountService, AccountServiceConfig},
    storage::{connect_pool, run_migrations, PostgresConfig},
};
use tracing::info;

/// Shared state plus the handles background tasks need
#[derive(Clone)]
pub struct Application {
    pub state: AppState,
    pub cooldown: Cooldown,
    /// Session tokens for seeded demo accounts, empty unless seeding is on
    pub demo_sessions: Vec<DemoSession>,
}

/// A seeded demo account and a session token for it
#[derive(Debug, Clone)]
pub struct DemoSession {
    pub account_id: AccountId,
    pub plan: PlanTier,
    pub session_token: String,
}

/// Create the application with default configuration
pub async fn create_application() -> anyhow::Result<Application> {
    create_application_with_config(&AppConfig::default()).await
}

/// Create the application with custom configuration
pub async fn create_application_with_config(config: &AppConfig) -> anyhow::Result<Application> {
    let policy = Arc::new(PlanPolicy::standard());
    let cooldown = Cooldown::new();
    let email_sender = create_email_sender(&config.email)?;
    let jwt_service = Arc::new(create_jwt_service(&config.auth));

    info!(
        backend = ?config.storage.backend,
        email_provider = email_sender.name(),
        "Initializing services"
    );

    let mut demo_sessions = Vec::new();

    let state = match config.storage.backend {
        StorageBackend::Memory => {
            let accounts = Arc::new(InMemoryAccountRepository::new());
            let keys = Arc::new(InMemoryApiKeyRepository::new());

            if config.storage.seed_demo_accounts {
                demo_sessions = seed_demo_accounts(accounts.as_ref(), &jwt_service).await?;
            }

            build_state(
                config,
                accounts,
                keys,
                policy,
                cooldown.clone(),
                email_sender,
                jwt_service,
            )
        }
        StorageBackend::Postgres => {
            let database_url = config.storage.database_url.clone().ok_or_else(|| {
                anyhow::anyhow!("storage.database_url is required for the postgres backend")
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(
                &PostgresConfig::new(database_url)
                    .with_max_connections(config.storage.max_connections),
            )
            .await?;
            info!("PostgreSQL connection established");

            let applied = run_migrations(&pool).await?;
            info!(applied, "Database schema up to date");

            build_state(
                config,
                Arc::new(PostgresAccountRepository::new(pool.clone())),
                Arc::new(PostgresApiKeyRepository::new(pool)),
                policy,
                cooldown.clone(),
                email_sender,
                jwt_service,
            )
        }
    };

    Ok(Application {
        state,
        cooldown,
        demo_sessions,
    })
}

/// Wire services over the given repositories
pub fn build_state<A, K>(
    config: &AppConfig,
    accounts: Arc<A>,
    keys: Arc<K>,
    policy: Arc<PlanPolicy>,
    cooldown: Cooldown,
    email_sender: Arc<dyn EmailSender>,
    jwt_service: Arc<JwtService>,
) -> AppState
where
    A: AccountRepository + 'static,
    K: ApiKeyRepository + 'static,
{
    let operation_timeout = config.storage.operation_timeout();

    let api_key_service = ApiKeyService::new(keys.clone(), accounts.clone(), policy.clone())
        .with_codec(KeyCodec::new(config.auth.key_prefix.clone()))
        .with_operation_timeout(operation_timeout);

    let account_service =
        AccountService::new(accounts, keys, policy.clone(), cooldown, email_sender).with_config(
            AccountServiceConfig {
                verification_interval: config.cooldown.verification_interval(),
                operation_timeout,
                public_base_url: config.public_base_url.0.clone(),
            },
        );

    AppState {
        api_key_service: Arc::new(api_key_service),
        account_service: Arc::new(account_service),
        plan_policy: policy,
        usage_meter: Arc::new(NoopUsageMeter),
        jwt_service,
        gateway: GatewaySettings {
            exempt_prefixes: config.auth.exempt_prefixes.clone(),
        },
    }
}

fn create_jwt_service(auth: &AuthConfig) -> JwtService {
    let mut jwt_config = JwtConfig::new(auth.jwt_secret.clone());
    if let Some(issuer) = &auth.jwt_issuer {
        jwt_config = jwt_config.with_issuer(issuer.clone());
    }
    JwtService::new(jwt_config)
}

/// One account per tier so the API can be exercised locally
async fn seed_demo_accounts<A: AccountRepository>(
    accounts: &A,
    jwt_service: &JwtService,
) -> anyhow::Result<Vec<DemoSession>> {
    let mut sessions = Vec::with_capacity(PlanTier::ALL.len());

    for tier in PlanTier::ALL {
        let id = AccountId::new(format!("demo-{}", tier))?;
        let account = Account::new(id, format!("demo+{}@worldcup-api.local", tier))?
            .with_name("Demo", tier.to_string())
            .with_plan(tier)
            // Free stays unconfirmed so the verification flow can be tried
            .with_email_confirmed(tier != PlanTier::Free);

        let account = accounts.create(account).await?;
        info!(account_id = %account.id(), plan = %tier, "Seeded demo account");

        sessions.push(DemoSession {
            session_token: jwt_service.issue(account.id())?,
            account_id: account.id().clone(),
            plan: tier,
        });
    }

    Ok(sessions)
}
