//! Profile and email verification endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::api_keys::MessageResponse;
use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::account::AccountId;
use crate::infrastructure::services::AccountProfile;

/// Profile response
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: AccountProfile,
}

/// Request carrying the token from a confirmation link
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmEmailRequest {
    pub account_id: String,
    pub token: String,
}

/// GET /account/profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.account_service.profile(&account_id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// POST /account/resend-confirmation
pub async fn resend_confirmation(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(account_id = %account_id, "Resending confirmation email");

    state
        .account_service
        .resend_confirmation(&account_id)
        .await?;

    Ok(Json(MessageResponse::ok("Confirmation email sent.")))
}

/// POST /account/confirm-email
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(request): Json<ConfirmEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let account_id = AccountId::new(request.account_id)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state
        .account_service
        .confirm_email(&account_id, &request.token)
        .await?;

    Ok(Json(MessageResponse::ok("Email confirmed.")))
}
