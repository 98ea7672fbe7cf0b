//! Public plan catalog

use axum::extract::State;
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::plan::PlanLimits;

#[derive(Debug, Clone, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanLimits>,
}

/// GET /plans
pub async fn list_plans(State(state): State<AppState>) -> Json<PlansResponse> {
    Json(PlansResponse {
        success: true,
        plans: state.plan_policy.catalog().into_iter().cloned().collect(),
    })
}
