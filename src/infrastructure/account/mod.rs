//! Account storage implementations

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresAccountRepository;
pub use repository::InMemoryAccountRepository;
