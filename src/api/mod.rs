//! API layer - HTTP endpoints and middleware

pub mod account;
pub mod health;
pub mod identity;
pub mod middleware;
pub mod plans;
pub mod router;
pub mod state;
pub mod types;
pub mod v1;

pub use middleware::Principal;
pub use router::create_router_with_state;
pub use state::AppState;
