//! Session authentication for account-scoped routes

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use super::auth::extract_bearer;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::account::AccountId;

/// Extractor that requires a valid session token
///
/// The token is the identity system's JWT, passed as
/// `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct RequireAccount(pub AccountId);

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers).ok_or_else(|| {
            ApiError::unauthorized(
                "Authentication required. Provide a session token via 'Authorization: Bearer <token>'",
            )
        })?;

        let claims = state.jwt_service.validate(token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized("Invalid or expired session token")
        })?;

        let account_id = claims
            .account_id()
            .map_err(|_| ApiError::unauthorized("Invalid or expired session token"))?;

        Ok(RequireAccount(account_id))
    }
}
