//! Public data API, served behind the API key gateway

pub mod me;

use axum::{routing::get, Router};

use super::state::AppState;

/// Create the v1 router; the gateway is layered on by the caller
pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/me", get(me::me))
}
