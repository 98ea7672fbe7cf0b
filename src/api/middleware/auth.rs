//! API key gateway
//!
//! Runs in front of the public data API. Turns `Authorization: Bearer <key>`
//! into a `Principal` request extension or rejects the request.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{FromRequestParts, OriginalUri, State},
    http::{header, request::Parts, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::account::AccountId;
use crate::domain::api_key::ApiKeyId;
use crate::domain::plan::{PlanFeature, PlanTier};

const MISSING_KEY: &str = "API Key required";
const INVALID_KEY: &str = "Invalid API Key";

/// How the caller proved its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
}

/// Verified identity attached to an authenticated request
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub plan: PlanTier,
    pub auth_method: AuthMethod,
    pub api_key_id: ApiKeyId,
}

/// Minimal body shared by both gateway rejections
#[derive(Debug, Serialize)]
struct RejectionBody {
    error: &'static str,
}

fn reject(message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(RejectionBody { error: message })).into_response()
}

/// Bearer token from the Authorization header, if present and well formed
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Whether `path` falls under `prefix`, matching whole path segments only
pub fn is_exempt_path(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Gateway middleware for API-key protected routes
pub async fn api_key_gateway(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Nested routers see a stripped URI; exemptions are written against the full path
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    if state
        .gateway
        .exempt_prefixes
        .iter()
        .any(|prefix| is_exempt_path(&path, prefix))
    {
        return next.run(request).await;
    }

    let Some(presented) = extract_bearer(request.headers()).map(str::to_string) else {
        debug!(path = %path, "Request without API key");
        return reject(MISSING_KEY);
    };

    let resolved = match state.api_key_service.authenticate(&presented).await {
        Ok(Some(resolved)) => resolved,
        Ok(None) => return reject(INVALID_KEY),
        Err(e) => return ApiError::from(e).into_response(),
    };

    let account = resolved.account;
    let plan = account.plan();

    if !state.plan_policy.has_feature(plan, PlanFeature::RestAccess) {
        return ApiError::forbidden("Your plan does not include REST API access.").into_response();
    }

    match state.usage_meter.counts(account.id()).await {
        Ok(counts) => {
            if !state
                .plan_policy
                .can_accept_request(plan, counts.daily, counts.per_minute)
            {
                debug!(account_id = %account.id(), plan = %plan, "Plan request ceiling reached");
                return ApiError::rate_limited(
                    "Request limit reached for your plan.",
                    Duration::from_secs(60),
                )
                .into_response();
            }
        }
        Err(e) => warn!(account_id = %account.id(), error = %e, "Usage meter unavailable"),
    }

    if let Err(e) = state.usage_meter.record(account.id()).await {
        warn!(account_id = %account.id(), error = %e, "Failed to record request");
    }

    request.extensions_mut().insert(Principal {
        account_id: account.id().clone(),
        plan,
        auth_method: AuthMethod::ApiKey,
        api_key_id: resolved.api_key.id(),
    });

    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| reject(MISSING_KEY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer wc_abc123".parse().unwrap());

        assert_eq!(extract_bearer(&headers), Some("wc_abc123"));
    }

    #[test]
    fn test_extract_bearer_trims_and_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "bearer   wc_abc123  ".parse().unwrap());

        assert_eq!(extract_bearer(&headers), Some("wc_abc123"));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn test_exempt_path_is_segment_aware() {
        assert!(is_exempt_path("/graphql", "/graphql"));
        assert!(is_exempt_path("/graphql/", "/graphql"));
        assert!(is_exempt_path("/graphql/schema", "/graphql/"));
        assert!(!is_exempt_path("/graphqlx", "/graphql"));
        assert!(!is_exempt_path("/api/v1/graphql", "/graphql"));
    }
}
