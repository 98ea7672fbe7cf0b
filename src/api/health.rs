//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of checking one dependency
#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub name: &'static str,
    pub status: ProbeStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: ProbeStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyCheck>,
}

impl ProbeResponse {
    fn from_checks(dependencies: Vec<DependencyCheck>) -> Self {
        let status = if dependencies
            .iter()
            .all(|check| check.status == ProbeStatus::Healthy)
        {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            dependencies,
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::from_checks(Vec::new()))
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

/// GET /ready
///
/// 503 while the credential store cannot be reached, so the gateway is taken
/// out of rotation instead of rejecting every key as invalid.
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    let started = Instant::now();
    let outcome = state.api_key_service.ping().await;

    let check = DependencyCheck {
        name: "credential_store",
        status: if outcome.is_ok() {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        },
        latency_ms: started.elapsed().as_millis() as u64,
        error: outcome.err().map(|e| e.to_string()),
    };

    let response = ProbeResponse::from_checks(vec![check]);
    let status = match response.status {
        ProbeStatus::Healthy => StatusCode::OK,
        ProbeStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: ProbeStatus) -> DependencyCheck {
        DependencyCheck {
            name: "credential_store",
            status,
            latency_ms: 3,
            error: None,
        }
    }

    #[test]
    fn test_no_dependencies_is_healthy() {
        let json = serde_json::to_value(ProbeResponse::from_checks(Vec::new())).unwrap();

        assert_eq!(json["status"], "healthy");
        assert!(json.get("dependencies").is_none());
    }

    #[test]
    fn test_any_unhealthy_dependency_fails_readiness() {
        let response =
            ProbeResponse::from_checks(vec![check(ProbeStatus::Healthy), check(ProbeStatus::Unhealthy)]);

        assert_eq!(response.status, ProbeStatus::Unhealthy);
    }

    #[test]
    fn test_check_serialization() {
        let mut failed = check(ProbeStatus::Unhealthy);
        failed.error = Some("Storage error: connection refused".to_string());

        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["name"], "credential_store");
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "Storage error: connection refused");
    }
}
