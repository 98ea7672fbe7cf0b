//! Domain layer - Core business logic and entities

pub mod account;
pub mod api_key;
pub mod email;
pub mod error;
pub mod plan;
pub mod usage_meter;

pub use account::{Account, AccountId, AccountRepository, AccountValidationError};
pub use api_key::{ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyValidationError};
pub use email::{EmailMessage, EmailSender};
pub use error::DomainError;
pub use plan::{PlanFeature, PlanFeatures, PlanLimits, PlanPolicy, PlanTier};
pub use usage_meter::{NoopUsageMeter, UsageCounts, UsageMeter};
