//! API key endpoints for the signed-in account owner

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::api_key::{ApiKeyListing, CreateApiKeyResult};

/// Request to create a new API key
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// API key as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<String>,
}

impl From<&ApiKeyListing> for ApiKeyResponse {
    fn from(listing: &ApiKeyListing) -> Self {
        let key = &listing.api_key;
        Self {
            id: key.id().to_string(),
            name: key.name().to_string(),
            preview: listing.preview.clone(),
            active: key.is_active(),
            created_at: key.created_at().to_rfc3339(),
            last_used_at: key.last_used_at().map(|dt| dt.to_rfc3339()),
        }
    }
}

/// List API keys response
#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub success: bool,
    pub api_keys: Vec<ApiKeyResponse>,
    pub active_count: usize,
    pub total: usize,
}

/// Creation response; the only place the full key ever appears
#[derive(Debug, Clone, Serialize)]
pub struct CreateApiKeyResponse {
    pub success: bool,
    pub message: String,
    pub plain_text_once: String,
    pub preview: String,
    pub api_key: ApiKeyResponse,
}

impl From<CreateApiKeyResult> for CreateApiKeyResponse {
    fn from(result: CreateApiKeyResult) -> Self {
        let listing = ApiKeyListing {
            api_key: result.api_key,
            preview: result.preview.clone(),
        };

        Self {
            success: true,
            message: "API key created. Copy it now, it will not be shown again.".to_string(),
            plain_text_once: result.plain_text_once,
            preview: result.preview,
            api_key: ApiKeyResponse::from(&listing),
        }
    }
}

/// Plain outcome body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// GET /account/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!(account_id = %account_id, "Listing API keys");

    let listings = state.api_key_service.list(&account_id).await?;

    let api_keys: Vec<ApiKeyResponse> = listings.iter().map(ApiKeyResponse::from).collect();
    let active_count = api_keys.iter().filter(|k| k.active).count();
    let total = api_keys.len();

    Ok(Json(ListApiKeysResponse {
        success: true,
        api_keys,
        active_count,
        total,
    }))
}

/// POST /account/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<Json<CreateApiKeyResponse>, ApiError> {
    debug!(account_id = %account_id, name = %request.name, "Creating API key");

    let created = state
        .api_key_service
        .create(&account_id, &request.name)
        .await?;

    Ok(Json(CreateApiKeyResponse::from(created)))
}

/// POST /account/api-keys/{key_id}/revoke
pub async fn revoke_api_key(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
    Path(key_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(account_id = %account_id, key_id = %key_id, "Revoking API key");

    state.api_key_service.revoke(&account_id, &key_id).await?;

    Ok(Json(MessageResponse::ok("API key revoked successfully.")))
}

/// DELETE /account/api-keys/{key_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    RequireAccount(account_id): RequireAccount,
    Path(key_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(account_id = %account_id, key_id = %key_id, "Deleting API key");

    state.api_key_service.delete(&account_id, &key_id).await?;

    Ok(Json(MessageResponse::ok("API key deleted successfully.")))
}
