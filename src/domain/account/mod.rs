//! Account domain
//!
//! The owning side of API keys: plan tier, email and verification state.

mod entity;
mod repository;
mod validation;

pub use entity::{Account, AccountId};
pub use repository::AccountRepository;
pub use validation::{validate_account_id, validate_email, AccountValidationError};
