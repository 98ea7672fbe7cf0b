//! Plan domain
//!
//! Subscription tiers, their limits, and the pure policy predicates that
//! gate key creation and request admission.

mod entity;
mod policy;

pub use entity::{PlanFeature, PlanFeatures, PlanLimits, PlanTier};
pub use policy::PlanPolicy;
