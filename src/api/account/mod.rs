//! Account self-service endpoints, authenticated by session token

pub mod api_keys;
pub mod profile;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create the account router
pub fn create_account_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::get_profile))
        .route("/resend-confirmation", post(profile::resend_confirmation))
        .route("/confirm-email", post(profile::confirm_email))
        .route("/api-keys", get(api_keys::list_api_keys))
        .route("/api-keys", post(api_keys::create_api_key))
        .route("/api-keys/{key_id}", delete(api_keys::delete_api_key))
        .route("/api-keys/{key_id}/revoke", post(api_keys::revoke_api_key))
}
