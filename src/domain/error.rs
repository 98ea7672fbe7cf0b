use std::time::Duration;

use thiserror::Error;

/// Core domain errors
///
/// `NotFound`, `LimitExceeded` and `RateLimited` are expected outcomes that
/// callers branch on; `Storage`, `Timeout` and `Internal` are faults.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("You have reached the maximum number of API keys ({limit}) for your plan.")]
    LimitExceeded { limit: u32 },

    #[error("Please wait {} minute(s) before trying again.", minutes_ceil(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn limit_exceeded(limit: u32) -> Self {
        Self::LimitExceeded { limit }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Whole minutes, rounded up, with a floor of one minute
pub fn minutes_ceil(duration: &Duration) -> u64 {
    (duration.as_millis() as u64).div_ceil(60_000).max(1)
}
