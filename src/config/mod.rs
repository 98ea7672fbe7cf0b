//! Configuration module

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CooldownConfig, EmailConfig, EmailProvider, LogFormat, LoggingConfig,
    PublicUrl, ServerConfig, StorageBackend, StorageConfig,
};
