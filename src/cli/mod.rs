//! CLI module for the identity service
//!
//! Provides subcommands:
//! - `serve`: HTTP server (default)
//! - `migrate`: apply or revert database schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// World Cup API identity service - API keys, plan quotas and request authentication
#[derive(Parser)]
#[command(name = "wc-identity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["wc-identity"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_migrate_revert_flag() {
        let cli = Cli::try_parse_from(["wc-identity", "migrate", "--revert"]).unwrap();

        match cli.command {
            Some(Command::Migrate(args)) => assert!(args.revert),
            _ => panic!("expected migrate command"),
        }
    }
}
