//! Plan tier and limit types

use serde::{Deserialize, Serialize};

/// Subscription tier of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl PlanTier {
    /// All tiers, cheapest first
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Premium, PlanTier::Pro];

    /// Parse a stored tier name
    ///
    /// Unrecognised names resolve to `Free`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "premium" => Self::Premium,
            "pro" => Self::Pro,
            _ => Self::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Pro => "pro",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature gated by plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanFeature {
    RestAccess,
    GraphqlAccess,
}

/// Feature flags carried by a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanFeatures {
    pub rest_access: bool,
    pub graphql_access: bool,
}

impl PlanFeatures {
    pub fn allows(&self, feature: PlanFeature) -> bool {
        match feature {
            PlanFeature::RestAccess => self.rest_access,
            PlanFeature::GraphqlAccess => self.graphql_access,
        }
    }
}

/// Limits and features for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub tier: PlanTier,
    pub name: String,
    /// Monthly price in cents
    pub monthly_price_cents: u32,
    pub daily_request_limit: u64,
    pub per_minute_request_limit: u64,
    pub max_keys: u32,
    pub features: PlanFeatures,
}

impl PlanLimits {
    /// Whether `other` is at least as restrictive as `self` on every ceiling
    pub(crate) fn is_stricter_than(&self, other: &PlanLimits) -> bool {
        (self.max_keys, self.per_minute_request_limit, self.daily_request_limit)
            < (other.max_keys, other.per_minute_request_limit, other.daily_request_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_known_tiers() {
        assert_eq!(PlanTier::parse_lenient("free"), PlanTier::Free);
        assert_eq!(PlanTier::parse_lenient("Premium"), PlanTier::Premium);
        assert_eq!(PlanTier::parse_lenient(" PRO "), PlanTier::Pro);
    }

    #[test]
    fn test_parse_lenient_unknown_is_free() {
        assert_eq!(PlanTier::parse_lenient("enterprise"), PlanTier::Free);
        assert_eq!(PlanTier::parse_lenient(""), PlanTier::Free);
    }

    #[test]
    fn test_tier_serialization() {
        let json = serde_json::to_string(&PlanTier::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
    }

    #[test]
    fn test_features_allows() {
        let features = PlanFeatures {
            rest_access: true,
            graphql_access: false,
        };

        assert!(features.allows(PlanFeature::RestAccess));
        assert!(!features.allows(PlanFeature::GraphqlAccess));
    }
}
