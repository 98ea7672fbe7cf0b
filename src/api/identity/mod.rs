//! Identity channel for signed-in accounts
//!
//! Mounted at the gateway's exempt prefix: callers authenticate with their
//! session token instead of an API key.

use axum::{routing::get, Router};

use super::account::profile;
use super::plans;
use super::state::AppState;

/// Mount point of the identity channel
pub const IDENTITY_CHANNEL_PATH: &str = "/graphql";

/// Create the identity channel router
pub fn create_identity_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::get_profile))
        .route("/plans", get(plans::list_plans))
}
