//! Migrate command - manages the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    connect_pool, revert_last_migration, run_migrations, PostgresConfig,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert: bool,

    /// Database URL; overrides `storage.database_url`
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Run the migrate command
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let database_url = args
        .database_url
        .or(config.storage.database_url)
        .ok_or_else(|| anyhow::anyhow!("a database URL is required to run migrations"))?;

    let pool = connect_pool(
        &PostgresConfig::new(database_url).with_max_connections(config.storage.max_connections),
    )
    .await?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = run_migrations(&pool).await?;
        info!(applied, "Migrations complete");
    }

    pool.close().await;
    Ok(())
}
