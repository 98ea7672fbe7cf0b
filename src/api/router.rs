use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::account;
use super::health;
use super::identity::{self, IDENTITY_CHANNEL_PATH};
use super::middleware::{api_key_gateway, logging_middleware};
use super::plans;
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    // Everything under the gateway; exempt prefixes are resolved inside it
    let gated = Router::new()
        .nest("/api/v1", v1::create_v1_router())
        .nest(IDENTITY_CHANNEL_PATH, identity::create_identity_router())
        .layer(middleware::from_fn_with_state(state.clone(), api_key_gateway));

    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Public plan catalog
        .route("/plans", get(plans::list_plans))
        // Account self-service (session token)
        .nest("/account", account::create_account_router())
        // Public data API (API key) and identity channel (session token)
        .merge(gated)
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, HeaderMap, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::account::{Account, AccountId, AccountRepository};
    use crate::domain::plan::{PlanPolicy, PlanTier};
    use crate::domain::usage_meter::{MockUsageMeter, UsageCounts};
    use crate::infrastructure::account::InMemoryAccountRepository;
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::cooldown::Cooldown;
    use crate::infrastructure::email::LogEmailSender;

    async fn test_state() -> AppState {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        for (id, tier) in [("fan-free", PlanTier::Free), ("fan-premium", PlanTier::Premium)] {
            let account = Account::new(AccountId::new(id).unwrap(), format!("{id}@example.com"))
                .unwrap()
                .with_plan(tier);
            accounts.create(account).await.unwrap();
        }

        crate::build_state(
            &AppConfig::default(),
            accounts,
            Arc::new(InMemoryApiKeyRepository::new()),
            Arc::new(PlanPolicy::standard()),
            Cooldown::new(),
            Arc::new(LogEmailSender::new()),
            Arc::new(JwtService::new(JwtConfig::new("router-test-secret"))),
        )
    }

    fn session_token(state: &AppState, account: &str) -> String {
        state
            .jwt_service
            .issue(&AccountId::new(account).unwrap())
            .unwrap()
    }

    fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, headers, body)
    }

    async fn create_key(router: &Router, token: &str, name: &str) -> (StatusCode, Value) {
        let (status, _, body) = send(
            router,
            request(
                Method::POST,
                "/account/api-keys",
                Some(token),
                Some(json!({ "name": name })),
            ),
        )
        .await;
        (status, body)
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected() {
        let router = create_router_with_state(test_state().await);

        let (status, _, body) = send(&router, request(Method::GET, "/api/v1/me", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "API Key required" }));
    }

    #[tokio::test]
    async fn test_unknown_api_key_is_rejected() {
        let router = create_router_with_state(test_state().await);

        let (status, _, body) = send(
            &router,
            request(Method::GET, "/api/v1/me", Some("wc_doesnotexist"), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid API Key" }));
    }

    #[tokio::test]
    async fn test_key_lifecycle_through_gateway() {
        let state = test_state().await;
        let token = session_token(&state, "fan-free");
        let router = create_router_with_state(state);

        let (status, created) = create_key(&router, &token, "Match widget").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["success"], true);

        let plain = created["plain_text_once"].as_str().unwrap().to_string();
        let key_id = created["api_key"]["id"].as_str().unwrap().to_string();
        assert!(plain.starts_with("wc_"));
        assert_eq!(created["preview"], created["api_key"]["preview"]);

        let (status, _, me) =
            send(&router, request(Method::GET, "/api/v1/me", Some(&plain), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["account_id"], "fan-free");
        assert_eq!(me["api_key_id"], key_id.as_str());
        assert_eq!(me["plan"], "free");
        assert_eq!(me["auth_method"], "api_key");

        // Listings never repeat the plaintext
        let (status, _, listed) = send(
            &router,
            request(Method::GET, "/account/api-keys", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 1);
        assert!(!listed.to_string().contains(&plain));

        let (status, _, revoked) = send(
            &router,
            request(
                Method::POST,
                &format!("/account/api-keys/{key_id}/revoke"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(revoked["message"], "API key revoked successfully.");

        let (status, _, body) =
            send(&router, request(Method::GET, "/api/v1/me", Some(&plain), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API Key");

        let (status, _, deleted) = send(
            &router,
            request(
                Method::DELETE,
                &format!("/account/api-keys/{key_id}"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "API key deleted successfully.");
    }

    #[tokio::test]
    async fn test_free_plan_key_limit() {
        let state = test_state().await;
        let token = session_token(&state, "fan-free");
        let router = create_router_with_state(state);

        let (status, _) = create_key(&router, &token, "first").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = create_key(&router, &token, "second").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "limit_exceeded");
        assert_eq!(
            body["error"],
            "You have reached the maximum number of API keys (1) for your plan."
        );
    }

    #[tokio::test]
    async fn test_other_accounts_keys_look_missing() {
        let state = test_state().await;
        let owner = session_token(&state, "fan-free");
        let intruder = session_token(&state, "fan-premium");
        let router = create_router_with_state(state);

        let (_, created) = create_key(&router, &owner, "mine").await;
        let key_id = created["api_key"]["id"].as_str().unwrap();

        let (status, _, body) = send(
            &router,
            request(
                Method::DELETE,
                &format!("/account/api-keys/{key_id}"),
                Some(&intruder),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "API key not found.");
    }

    #[tokio::test]
    async fn test_malformed_key_id() {
        let state = test_state().await;
        let token = session_token(&state, "fan-free");
        let router = create_router_with_state(state);

        let (status, _, body) = send(
            &router,
            request(
                Method::POST,
                "/account/api-keys/not-a-uuid/revoke",
                Some(&token),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_id");
    }

    #[tokio::test]
    async fn test_account_routes_require_session() {
        let router = create_router_with_state(test_state().await);

        let (status, _, _) =
            send(&router, request(Method::GET, "/account/profile", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(
            &router,
            request(Method::GET, "/account/profile", Some("not.a.jwt"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_reports_plan_limits() {
        let state = test_state().await;
        let token = session_token(&state, "fan-premium");
        let router = create_router_with_state(state);

        let (status, _, body) = send(
            &router,
            request(Method::GET, "/account/profile", Some(&token), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["max_keys"], 3);
        assert_eq!(body["profile"]["max_keys"], 3);
        assert_eq!(body["profile"]["active_keys"], 0);
    }

    #[tokio::test]
    async fn test_resend_confirmation_cooldown() {
        let state = test_state().await;
        let token = session_token(&state, "fan-free");
        let router = create_router_with_state(state);

        let (status, _, body) = send(
            &router,
            request(Method::POST, "/account/resend-confirmation", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Confirmation email sent.");

        let (status, headers, body) = send(
            &router,
            request(Method::POST, "/account/resend-confirmation", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Please wait 2 minute(s) before trying again.");
        assert!(headers.contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_request_ceiling_returns_429() {
        let mut state = test_state().await;
        let token = session_token(&state, "fan-free");

        let mut meter = MockUsageMeter::new();
        meter.expect_counts().returning(|_| {
            Ok(UsageCounts {
                daily: 500,
                per_minute: 0,
            })
        });
        meter.expect_record().never();
        state.usage_meter = Arc::new(meter);

        let router = create_router_with_state(state);
        let (_, created) = create_key(&router, &token, "busy").await;
        let plain = created["plain_text_once"].as_str().unwrap();

        let (status, headers, body) =
            send(&router, request(Method::GET, "/api/v1/me", Some(plain), None)).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "rate_limited");
        assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "60");
    }

    #[tokio::test]
    async fn test_identity_channel_bypasses_gateway() {
        let state = test_state().await;
        let token = session_token(&state, "fan-premium");
        let router = create_router_with_state(state);

        let (status, _, body) =
            send(&router, request(Method::GET, "/graphql/plans", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plans"].as_array().unwrap().len(), 3);

        let (status, _, body) =
            send(&router, request(Method::GET, "/graphql/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["max_keys"], 3);

        let (status, _, body) =
            send(&router, request(Method::GET, "/graphql/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_identity_channel_gated_without_exemption() {
        let mut state = test_state().await;
        state.gateway.exempt_prefixes.clear();
        let router = create_router_with_state(state);

        let (status, _, body) =
            send(&router, request(Method::GET, "/graphql/plans", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "API Key required" }));
    }

    #[tokio::test]
    async fn test_plans_and_health_endpoints() {
        let router = create_router_with_state(test_state().await);

        let (status, _, body) = send(&router, request(Method::GET, "/plans", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plans"].as_array().unwrap().len(), 3);
        assert_eq!(body["plans"][0]["tier"], "free");

        let (status, _, body) = send(&router, request(Method::GET, "/ready", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, headers, _) = send(&router, request(Method::GET, "/live", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key("x-request-id"));
    }
}
