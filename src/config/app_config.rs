use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub cooldown: CooldownConfig,
    pub email: EmailConfig,
    /// Base URL used to build links in outgoing email
    pub public_base_url: PublicUrl,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Upper bound for a single storage call
    pub operation_timeout_ms: u64,
    /// Seed one demo account per plan when using the memory backend
    pub seed_demo_accounts: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub key_prefix: String,
    /// Path prefixes served without API key authentication
    pub exempt_prefixes: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub verification_interval_secs: u64,
    pub sweep_interval_secs: u64,
    /// Extra age beyond the interval before an entry is swept
    pub sweep_margin_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    Log,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    /// Delivery endpoint for the HTTP provider
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PublicUrl(pub String);

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
            operation_timeout_ms: 5_000,
            seed_demo_accounts: true,
        }
    }
}

impl StorageConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_prefix: "wc_".to_string(),
            exempt_prefixes: vec!["/graphql".to_string()],
            jwt_secret: "change-me-in-production".to_string(),
            jwt_issuer: None,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            verification_interval_secs: 120,
            sweep_interval_secs: 300,
            sweep_margin_secs: 3_600,
        }
    }
}

impl CooldownConfig {
    pub fn verification_interval(&self) -> Duration {
        Duration::from_secs(self.verification_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Age after which an entry can no longer affect a decision, plus margin
    pub fn sweep_max_age(&self) -> Duration {
        Duration::from_secs(self.verification_interval_secs + self.sweep_margin_secs)
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProvider::default(),
            endpoint: None,
            api_key: None,
            from: "no-reply@worldcup-api.local".to_string(),
            from_name: "World Cup API".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for PublicUrl {
    fn default() -> Self {
        Self("http://localhost:8080".to_string())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.exempt_prefixes")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
