//! Plan policy: tier lookup and quota predicates

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::entity::{PlanFeature, PlanFeatures, PlanLimits, PlanTier};
use crate::domain::DomainError;

static DEFAULT_CATALOG: Lazy<Vec<PlanLimits>> = Lazy::new(|| {
    vec![
        PlanLimits {
            tier: PlanTier::Free,
            name: "Free".to_string(),
            monthly_price_cents: 0,
            daily_request_limit: 500,
            per_minute_request_limit: 10,
            max_keys: 1,
            features: PlanFeatures {
                rest_access: true,
                graphql_access: false,
            },
        },
        PlanLimits {
            tier: PlanTier::Premium,
            name: "Premium".to_string(),
            monthly_price_cents: 999,
            daily_request_limit: 25_000,
            per_minute_request_limit: 100,
            max_keys: 3,
            features: PlanFeatures {
                rest_access: true,
                graphql_access: false,
            },
        },
        PlanLimits {
            tier: PlanTier::Pro,
            name: "Pro".to_string(),
            monthly_price_cents: 4999,
            daily_request_limit: 250_000,
            per_minute_request_limit: 1_000,
            max_keys: 10,
            features: PlanFeatures {
                rest_access: true,
                graphql_access: true,
            },
        },
    ]
});

/// Read-only lookup from plan tier to limits
///
/// Built once at startup and shared behind an `Arc`; never mutated.
#[derive(Debug, Clone)]
pub struct PlanPolicy {
    plans: HashMap<PlanTier, PlanLimits>,
    most_restrictive: PlanLimits,
}

impl PlanPolicy {
    /// Policy over the built-in three-tier catalog
    pub fn standard() -> Self {
        let plans = DEFAULT_CATALOG.iter().map(|p| (p.tier, p.clone())).collect();

        Self {
            plans,
            most_restrictive: DEFAULT_CATALOG[0].clone(),
        }
    }

    /// Policy over a custom catalog
    ///
    /// Tiers missing from the catalog resolve to its most restrictive entry.
    pub fn with_catalog(catalog: Vec<PlanLimits>) -> Result<Self, DomainError> {
        let most_restrictive = catalog
            .iter()
            .fold(None::<&PlanLimits>, |acc, plan| match acc {
                Some(current) if !plan.is_stricter_than(current) => Some(current),
                _ => Some(plan),
            })
            .cloned()
            .ok_or_else(|| DomainError::configuration("Plan catalog cannot be empty"))?;

        let plans = catalog.into_iter().map(|p| (p.tier, p)).collect();

        Ok(Self {
            plans,
            most_restrictive,
        })
    }

    /// Limits for a tier; total over all inputs
    pub fn limits(&self, tier: PlanTier) -> &PlanLimits {
        self.plans.get(&tier).unwrap_or(&self.most_restrictive)
    }

    /// Whether an owner with `active_count` live keys may create another
    pub fn can_create_key(&self, tier: PlanTier, active_count: u32) -> bool {
        active_count < self.limits(tier).max_keys
    }

    /// Whether a request fits under both ceilings
    ///
    /// Counts come from the metering collaborator; this is pure policy.
    pub fn can_accept_request(&self, tier: PlanTier, daily_count: u64, minute_count: u64) -> bool {
        let limits = self.limits(tier);
        daily_count < limits.daily_request_limit && minute_count < limits.per_minute_request_limit
    }

    pub fn has_feature(&self, tier: PlanTier, feature: PlanFeature) -> bool {
        self.limits(tier).features.allows(feature)
    }

    /// The catalog ordered cheapest tier first
    pub fn catalog(&self) -> Vec<&PlanLimits> {
        let mut plans: Vec<&PlanLimits> = self.plans.values().collect();
        plans.sort_by_key(|p| p.tier);
        plans
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
