//! API error responses

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    pub retry_after: Option<Duration>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                success: false,
                error: message.into(),
                code: code.to_string(),
            },
            retry_after: None,
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }

    /// Permission error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Rate limit error
    pub fn rate_limited(message: impl Into<String>, retry_after: Duration) -> Self {
        let mut err = Self::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", message);
        err.retry_after = Some(retry_after);
        err
    }

    fn unexpected(err: &DomainError, status: StatusCode, code: &str) -> Self {
        error!(error = %err, status = status.as_u16(), "Request failed unexpectedly");

        let message = if cfg!(debug_assertions) {
            err.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        };
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidId { message } => Self::new(StatusCode::BAD_REQUEST, "invalid_id", message),
            DomainError::Conflict { message } => Self::new(StatusCode::CONFLICT, "conflict", message),
            DomainError::LimitExceeded { .. } => {
                Self::new(StatusCode::FORBIDDEN, "limit_exceeded", err.to_string())
            }
            DomainError::RateLimited { retry_after } => {
                Self::rate_limited(err.to_string(), *retry_after)
            }
            DomainError::Timeout { .. } => {
                Self::unexpected(&err, StatusCode::GATEWAY_TIMEOUT, "timeout")
            }
            DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => {
                Self::unexpected(&err, StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.code, self.response.error)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_message() {
        let api_err: ApiError = DomainError::not_found("API key not found.").into();

        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
        assert_eq!(api_err.response.error, "API key not found.");
        assert!(!api_err.response.success);
    }

    #[test]
    fn test_limit_exceeded_is_forbidden() {
        let api_err: ApiError = DomainError::limit_exceeded(3).into();

        assert_eq!(api_err.status, StatusCode::FORBIDDEN);
        assert_eq!(api_err.response.code, "limit_exceeded");
        assert!(api_err.response.error.contains("(3)"));
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let api_err: ApiError = DomainError::rate_limited(Duration::from_millis(59_500)).into();
        assert_eq!(api_err.status, StatusCode::TOO_MANY_REQUESTS);

        let response = api_err.into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let api_err: ApiError = DomainError::storage("connection refused").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        if cfg!(debug_assertions) {
            assert!(api_err.response.error.contains("connection refused"));
        } else {
            assert_eq!(api_err.response.error, GENERIC_FAILURE);
        }
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        let api_err: ApiError = DomainError::timeout("create api key").into();
        assert_eq!(api_err.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::bad_request("Email is already confirmed.");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Email is already confirmed.");
        assert_eq!(json["code"], "invalid_request");
    }
}
