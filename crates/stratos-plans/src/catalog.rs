// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plan catalog.
//!
//! These are the shipped defaults; deployments override them through the
//! `[[plans]]` array in stratos.toml. Order matters: the first entry is the
//! default tier unrecognized plan names normalize to.

use stratos_core::ModelTier;

use crate::registry::{Plan, PlanKind, QuotaLimit};

/// Name of the one-time single-report product.
pub const ONE_TIME_REPORT: &str = "One-Time Enterprise Report";

/// Follow-ups granted with a one-time report purchase.
pub const ONE_TIME_FOLLOW_UPS: u32 = 2;

/// The shipped plan catalog, free tier first.
pub fn builtin_catalog() -> Vec<Plan> {
    vec![
        Plan {
            name: "The Foundation (Free)".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 0,
            max_queries: QuotaLimit::Limited(3),
            max_documents: 1,
            max_experts: 2,
            max_follow_ups: 1,
            model_tier: ModelTier::Standard,
            follow_up_model_tier: None,
            summary_available: false,
        },
        Plan {
            name: "The Tactician".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 9,
            max_queries: QuotaLimit::Limited(8),
            max_documents: 2,
            max_experts: 3,
            max_follow_ups: 2,
            model_tier: ModelTier::Premium,
            follow_up_model_tier: None,
            summary_available: false,
        },
        Plan {
            name: "The Assembly".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 19,
            max_queries: QuotaLimit::Limited(12),
            max_documents: 3,
            max_experts: 4,
            max_follow_ups: 2,
            model_tier: ModelTier::Premium,
            follow_up_model_tier: None,
            summary_available: false,
        },
        Plan {
            name: "The Professional".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 69,
            max_queries: QuotaLimit::Limited(15),
            max_documents: 5,
            max_experts: 5,
            max_follow_ups: 5,
            model_tier: ModelTier::Premium,
            // Follow-ups run on the cheaper tier as a cost-control measure.
            follow_up_model_tier: Some(ModelTier::Standard),
            summary_available: true,
        },
        Plan {
            name: "The Growth".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 500,
            max_queries: QuotaLimit::Limited(50),
            max_documents: 10,
            max_experts: 5,
            max_follow_ups: 10,
            model_tier: ModelTier::Premium,
            follow_up_model_tier: Some(ModelTier::Premium),
            summary_available: true,
        },
        Plan {
            name: "Enterprise".to_string(),
            kind: PlanKind::Subscription,
            price_gbp: 5000,
            max_queries: QuotaLimit::Limited(100),
            max_documents: 10,
            max_experts: 5,
            max_follow_ups: 10,
            model_tier: ModelTier::Premium,
            follow_up_model_tier: Some(ModelTier::Premium),
            summary_available: true,
        },
        Plan {
            name: ONE_TIME_REPORT.to_string(),
            kind: PlanKind::OneTime,
            price_gbp: 25,
            max_queries: QuotaLimit::Limited(1),
            max_documents: 1,
            max_experts: 5,
            max_follow_ups: ONE_TIME_FOLLOW_UPS,
            model_tier: ModelTier::Premium,
            follow_up_model_tier: None,
            summary_available: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlanRegistry;
    use stratos_core::ServiceKind;

    #[test]
    fn builtin_catalog_builds_a_valid_registry() {
        let registry = PlanRegistry::from_plans(builtin_catalog()).unwrap();
        assert_eq!(registry.default_plan().name, "The Foundation (Free)");
        assert_eq!(registry.list().count(), 7);
    }

    #[test]
    fn free_tier_entitlements() {
        let registry = PlanRegistry::builtin();
        let free = registry.get("The Foundation (Free)").unwrap();
        assert_eq!(free.limit_for(ServiceKind::Queries), QuotaLimit::Limited(3));
        assert_eq!(free.max_documents, 1);
        assert_eq!(free.max_experts, 2);
        assert_eq!(free.max_follow_ups, 1);
        assert_eq!(free.model_tier, ModelTier::Standard);
        assert!(!free.summary_available);
    }

    #[test]
    fn professional_follow_ups_run_on_standard_tier() {
        let registry = PlanRegistry::builtin();
        let pro = registry.get("The Professional").unwrap();
        assert_eq!(pro.model_tier, ModelTier::Premium);
        assert_eq!(pro.follow_up_tier(), ModelTier::Standard);
        assert!(pro.summary_available);
    }

    #[test]
    fn one_time_product_is_single_query() {
        let registry = PlanRegistry::builtin();
        let one_time = registry.get(ONE_TIME_REPORT).unwrap();
        assert_eq!(one_time.kind, PlanKind::OneTime);
        assert_eq!(one_time.max_queries, QuotaLimit::Limited(1));
        assert_eq!(one_time.max_follow_ups, ONE_TIME_FOLLOW_UPS);
    }

    #[test]
    fn catalog_order_is_price_ascending_until_one_time() {
        let catalog = builtin_catalog();
        let prices: Vec<u32> = catalog
            .iter()
            .take_while(|p| p.kind == PlanKind::Subscription)
            .map(|p| p.price_gbp)
            .collect();
        let mut sorted = prices.clone();
        sorted.sort_unstable();
        assert_eq!(prices, sorted);
    }
}
