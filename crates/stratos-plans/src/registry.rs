// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan types and the read-only plan registry.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};
use tracing::warn;

use stratos_core::{ModelTier, ServiceKind, StratosError};

/// A quota ceiling: a concrete count or no ceiling at all.
///
/// In TOML/JSON this is either an integer or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLimit {
    /// At most this many units between resets.
    Limited(u32),
    /// No ceiling; admission never touches the counter.
    Unlimited,
}

impl QuotaLimit {
    /// Whether a current count is still below the ceiling.
    pub fn allows(self, count: u64) -> bool {
        match self {
            QuotaLimit::Limited(limit) => count < u64::from(limit),
            QuotaLimit::Unlimited => true,
        }
    }

    /// The numeric ceiling, if any.
    pub fn ceiling(self) -> Option<u32> {
        match self {
            QuotaLimit::Limited(limit) => Some(limit),
            QuotaLimit::Unlimited => None,
        }
    }
}

impl Serialize for QuotaLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuotaLimit::Limited(n) => serializer.serialize_u32(*n),
            QuotaLimit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for QuotaLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Word(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(QuotaLimit::Limited(n)),
            Raw::Word(w) if w.eq_ignore_ascii_case("unlimited") => Ok(QuotaLimit::Unlimited),
            Raw::Word(w) => Err(D::Error::custom(format!(
                "quota limit must be a count or \"unlimited\", got `{w}`"
            ))),
        }
    }
}

/// Whether a plan recurs or is a single purchase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Recurring subscription; counters reset periodically.
    #[default]
    Subscription,
    /// One-time purchase: exactly one report ever plus a fixed
    /// follow-up grant, accounted outside the periodic cycle.
    OneTime,
}

/// A named bundle of entitlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Display/lookup name, e.g. "The Foundation (Free)".
    pub name: String,

    /// Subscription or one-time purchase.
    #[serde(default)]
    pub kind: PlanKind,

    /// Monthly (or one-off) price in GBP; informational only.
    #[serde(default)]
    pub price_gbp: u32,

    /// Report queries per period.
    pub max_queries: QuotaLimit,

    /// Document uploads per period.
    pub max_documents: u32,

    /// Maximum expert personas per report.
    pub max_experts: u32,

    /// Follow-up questions per period.
    pub max_follow_ups: u32,

    /// Model tier used for reports.
    #[serde(default)]
    pub model_tier: ModelTier,

    /// Optional cheaper/costlier tier override for follow-ups.
    #[serde(default)]
    pub follow_up_model_tier: Option<ModelTier>,

    /// Whether the executive summary is available.
    #[serde(default)]
    pub summary_available: bool,
}

impl Plan {
    /// Quota ceiling for a metered service under this plan.
    pub fn limit_for(&self, service: ServiceKind) -> QuotaLimit {
        match service {
            ServiceKind::Queries => self.max_queries,
            ServiceKind::FollowUps => QuotaLimit::Limited(self.max_follow_ups),
            ServiceKind::DocumentUploads => QuotaLimit::Limited(self.max_documents),
        }
    }

    /// Model tier for follow-ups, falling back to the report tier.
    pub fn follow_up_tier(&self) -> ModelTier {
        self.follow_up_model_tier.unwrap_or(self.model_tier)
    }
}

/// Ordered, read-only catalog of plans.
///
/// Insertion order is preserved for presentation; the first plan is the
/// default tier that unrecognized plan names normalize to.
#[derive(Debug, Clone)]
pub struct PlanRegistry {
    plans: Vec<Plan>,
}

impl PlanRegistry {
    /// Build a registry from an ordered plan list.
    ///
    /// The list must be non-empty with unique names, and the first entry
    /// (the normalization fallback) must be a subscription plan.
    pub fn from_plans(plans: Vec<Plan>) -> Result<Self, StratosError> {
        let Some(first) = plans.first() else {
            return Err(StratosError::Config("plan catalog is empty".to_string()));
        };
        if first.kind == PlanKind::OneTime {
            return Err(StratosError::Config(format!(
                "default plan `{}` must not be a one-time product",
                first.name
            )));
        }
        for (i, plan) in plans.iter().enumerate() {
            if plans[..i].iter().any(|p| p.name == plan.name) {
                return Err(StratosError::Config(format!(
                    "duplicate plan name `{}`",
                    plan.name
                )));
            }
        }
        Ok(Self { plans })
    }

    /// Registry over the built-in catalog.
    pub fn builtin() -> Self {
        Self {
            plans: crate::catalog::builtin_catalog(),
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name == name)
    }

    /// All plans in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter()
    }

    /// The default (fallback) tier.
    pub fn default_plan(&self) -> &Plan {
        &self.plans[0]
    }

    /// Resolve a possibly-stale plan name to a known plan.
    ///
    /// Unknown names fall back to the default tier; the anomaly is logged
    /// for operator follow-up, never surfaced to the end user.
    pub fn normalize(&self, name: &str) -> &Plan {
        match self.get(name) {
            Some(plan) => plan,
            None => {
                let fallback = self.default_plan();
                warn!(
                    plan = %name,
                    fallback = %fallback.name,
                    "unrecognized plan name, normalizing to default tier"
                );
                fallback
            }
        }
    }
}
