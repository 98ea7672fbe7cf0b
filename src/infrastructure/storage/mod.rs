//! Storage infrastructure - connection pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{
    identity_migrations, revert_last_migration, run_migrations, Migration, PostgresMigrator,
};
pub use postgres::{connect_pool, PostgresConfig};
