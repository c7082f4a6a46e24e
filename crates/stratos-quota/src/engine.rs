// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota admission pipeline.
//!
//! Every caller goes through the same ordered rule pipeline, so precedence
//! (admin bypass first, fail-closed on unknown plans, one-time product
//! special cases, then plan limits) is enforced in exactly one place.
//! Metered admission is atomic: the store's check-and-increment guarantees
//! that at `count == limit - 1` exactly one of N concurrent requests wins.

use std::sync::Arc;

use tracing::{debug, warn};

use stratos_core::{
    AdminDirectory, KeyValueStore, OneTimeGrants, ServiceKind, StoreKey, StratosError, UserId,
};
use stratos_plans::{Plan, PlanKind, PlanRegistry, QuotaLimit};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted(GrantReason),
    Denied(DenialReason),
}

impl Admission {
    pub fn allowed(&self) -> bool {
        matches!(self, Admission::Granted(_))
    }
}

/// Why a request was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    /// Administrator accounts bypass all metering.
    AdminBypass,
    /// The plan carries no ceiling for this service.
    Unlimited,
    /// Below the plan limit; the counter was incremented.
    WithinLimit,
    /// The single lifetime query of a one-time purchase.
    OneTimeQuery,
    /// Follow-ups remain on an active one-time grant.
    OneTimeFollowUp,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The plan identifier is not in the registry (fail closed).
    UnknownPlan,
    /// The usage counter reached the plan limit.
    LimitReached,
    /// The one-time entitlement is spent.
    OneTimeExhausted,
}

/// The admission rules, applied strictly in this order, first decision wins.
const PIPELINE: [Rule; 5] = [
    Rule::AdminBypass,
    Rule::PlanRecognized,
    Rule::OneTimeProduct,
    Rule::Unlimited,
    Rule::Metered,
];

#[derive(Debug, Clone, Copy)]
enum Rule {
    AdminBypass,
    PlanRecognized,
    OneTimeProduct,
    Unlimited,
    Metered,
}

enum Outcome {
    Decided(Admission),
    Continue,
}

/// Admission engine over the counter store, admin directory, grant table,
/// and plan registry. The engine owns usage-counter and grant mutation
/// exclusively; no other component writes those namespaces.
#[derive(Clone)]
pub struct QuotaEngine {
    store: Arc<dyn KeyValueStore>,
    admins: Arc<dyn AdminDirectory>,
    grants: Arc<dyn OneTimeGrants>,
    registry: Arc<PlanRegistry>,
}

impl QuotaEngine {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        admins: Arc<dyn AdminDirectory>,
        grants: Arc<dyn OneTimeGrants>,
        registry: Arc<PlanRegistry>,
    ) -> Self {
        Self {
            store,
            admins,
            grants,
            registry,
        }
    }

    /// Decide admission for one request and, when admitted against a
    /// metered limit, consume one unit in the same step.
    ///
    /// A store failure is an error, never a denial, so callers can tell
    /// "try again later" apart from "limit reached".
    pub async fn check_and_consume(
        &self,
        user: UserId,
        plan_name: &str,
        service: ServiceKind,
    ) -> Result<Admission, StratosError> {
        for rule in PIPELINE {
            if let Outcome::Decided(admission) = self.apply(rule, user, plan_name, service).await? {
                debug!(
                    user_id = %user,
                    plan = plan_name,
                    service = %service,
                    ?admission,
                    "admission decided"
                );
                return Ok(admission);
            }
        }
        Err(StratosError::Internal(
            "admission pipeline reached no decision".to_string(),
        ))
    }

    async fn apply(
        &self,
        rule: Rule,
        user: UserId,
        plan_name: &str,
        service: ServiceKind,
    ) -> Result<Outcome, StratosError> {
        match rule {
            Rule::AdminBypass => {
                if self.admins.is_admin(user).await? {
                    return Ok(Outcome::Decided(Admission::Granted(GrantReason::AdminBypass)));
                }
                Ok(Outcome::Continue)
            }
            Rule::PlanRecognized => {
                if self.registry.get(plan_name).is_none() {
                    warn!(user_id = %user, plan = plan_name, "unrecognized plan, denying");
                    return Ok(Outcome::Decided(Admission::Denied(
                        DenialReason::UnknownPlan,
                    )));
                }
                Ok(Outcome::Continue)
            }
            Rule::OneTimeProduct => {
                let plan = self.plan(plan_name)?;
                if plan.kind != PlanKind::OneTime {
                    return Ok(Outcome::Continue);
                }
                match service {
                    // One query, ever. Lifetime admission rides the same
                    // atomic check-and-increment as metered plans, with a
                    // ceiling of 1.
                    ServiceKind::Queries => {
                        let key = StoreKey::usage(user, service);
                        let admitted = self.store.admit(&key, 1).await?;
                        Ok(Outcome::Decided(if admitted {
                            Admission::Granted(GrantReason::OneTimeQuery)
                        } else {
                            Admission::Denied(DenialReason::OneTimeExhausted)
                        }))
                    }
                    // Checking a follow-up consumes nothing; depletion is
                    // the explicit consume_one_time_follow_up call.
                    ServiceKind::FollowUps => {
                        let remaining = self.grants.remaining_follow_ups(user).await?;
                        Ok(Outcome::Decided(if remaining > 0 {
                            Admission::Granted(GrantReason::OneTimeFollowUp)
                        } else {
                            Admission::Denied(DenialReason::OneTimeExhausted)
                        }))
                    }
                    // Other services fall through to the plan's own limits.
                    ServiceKind::DocumentUploads => Ok(Outcome::Continue),
                }
            }
            Rule::Unlimited => {
                let plan = self.plan(plan_name)?;
                if plan.limit_for(service) == QuotaLimit::Unlimited {
                    return Ok(Outcome::Decided(Admission::Granted(GrantReason::Unlimited)));
                }
                Ok(Outcome::Continue)
            }
            Rule::Metered => {
                let plan = self.plan(plan_name)?;
                let limit = match plan.limit_for(service) {
                    QuotaLimit::Limited(n) => u64::from(n),
                    // Unreachable behind the Unlimited rule; treat as open.
                    QuotaLimit::Unlimited => {
                        return Ok(Outcome::Decided(Admission::Granted(GrantReason::Unlimited)));
                    }
                };
                let key = StoreKey::usage(user, service);
                let admitted = self.store.admit(&key, limit).await?;
                Ok(Outcome::Decided(if admitted {
                    Admission::Granted(GrantReason::WithinLimit)
                } else {
                    Admission::Denied(DenialReason::LimitReached)
                }))
            }
        }
    }

    fn plan(&self, plan_name: &str) -> Result<&Plan, StratosError> {
        // The PlanRecognized rule runs first, so a miss here is a pipeline bug.
        self.registry
            .get(plan_name)
            .ok_or_else(|| StratosError::UnknownPlan {
                plan: plan_name.to_string(),
            })
    }

    /// Upsert a fresh one-time grant for the user.
    ///
    /// Re-granting resets remaining follow-ups; intentional for repurchase.
    pub async fn grant_one_time_access(&self, user: UserId) -> Result<(), StratosError> {
        self.grants.grant(user).await
    }

    /// Deplete one follow-up from the user's one-time grant.
    ///
    /// Callers must hold a successful follow-up admission from
    /// [`check_and_consume`](Self::check_and_consume) first; the store
    /// clamps at zero rather than going negative if they don't.
    pub async fn consume_one_time_follow_up(&self, user: UserId) -> Result<(), StratosError> {
        self.grants.consume_follow_up(user).await
    }

    /// Current counter value for a (user, service) pair. Absent reads as 0.
    pub async fn usage(&self, user: UserId, service: ServiceKind) -> Result<u64, StratosError> {
        self.store.counter(&StoreKey::usage(user, service)).await
    }
}
