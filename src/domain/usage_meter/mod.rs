//! Request metering hook
//!
//! Persistent metering is not part of this service. The gateway asks a
//! `UsageMeter` for current counts and reports each accepted request; the
//! default implementation reports nothing.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::account::AccountId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Request counts for one account in the current windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCounts {
    pub daily: u64,
    pub per_minute: u64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UsageMeter: Send + Sync + Debug {
    /// Current counts for `owner`
    async fn counts(&self, owner: &AccountId) -> Result<UsageCounts, DomainError>;

    /// Record one accepted request
    async fn record(&self, owner: &AccountId) -> Result<(), DomainError>;
}

/// Meter that always reports zero usage
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsageMeter;

#[async_trait]
impl UsageMeter for NoopUsageMeter {
    async fn counts(&self, _owner: &AccountId) -> Result<UsageCounts, DomainError> {
        Ok(UsageCounts::default())
    }

    async fn record(&self, _owner: &AccountId) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_meter_reports_zero() {
        let meter = NoopUsageMeter;
        let owner = AccountId::new("user1").unwrap();

        assert_eq!(meter.counts(&owner).await.unwrap(), UsageCounts::default());
        assert!(meter.record(&owner).await.is_ok());
    }
}
