//! Identity echo for API key holders

use axum::extract::State;
use serde::Serialize;

use crate::api::middleware::{AuthMethod, Principal};
use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::plan::PlanTier;

/// Who the presented key belongs to and what it may do
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub account_id: String,
    pub api_key_id: String,
    pub plan: PlanTier,
    pub auth_method: AuthMethod,
    pub daily_request_limit: u64,
    pub per_minute_request_limit: u64,
}

/// GET /api/v1/me
pub async fn me(State(state): State<AppState>, principal: Principal) -> Json<MeResponse> {
    let limits = state.plan_policy.limits(principal.plan);

    Json(MeResponse {
        success: true,
        account_id: principal.account_id.to_string(),
        api_key_id: principal.api_key_id.to_string(),
        plan: principal.plan,
        auth_method: principal.auth_method,
        daily_request_limit: limits.daily_request_limit,
        per_minute_request_limit: limits.per_minute_request_limit,
    })
}
