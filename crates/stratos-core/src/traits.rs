// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the core.
//!
//! Each trait is object-safe and implemented by a concrete adapter crate
//! (`stratos-storage`, `stratos-generate`) or by a test fake
//! (`stratos-test-utils`). Components hold `Arc<dyn Trait>` handles built
//! at startup; there is no process-global client state.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StratosError;
use crate::key::{KeyClass, StoreKey};
use crate::types::{ModelTier, QueryRecord, UserId};

/// The shared key-value substrate: counters and cache entries.
///
/// Counter reads follow an explicit get-or-zero contract: an absent or
/// non-numeric value reads as 0, never as an error. Admission
/// (`admit`) must be atomic with respect to concurrent callers of the same
/// key: at `count == limit - 1`, exactly one of N concurrent calls may win.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value. Expired entries read as `None`.
    async fn fetch(&self, key: &StoreKey) -> Result<Option<String>, StratosError>;

    /// Store a value, optionally with a time-to-live.
    async fn store(
        &self,
        key: &StoreKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StratosError>;

    /// Remove an entry. Removing an absent key is not an error.
    async fn remove(&self, key: &StoreKey) -> Result<(), StratosError>;

    /// Read a counter; absent, expired, or non-numeric values read as 0.
    async fn counter(&self, key: &StoreKey) -> Result<u64, StratosError>;

    /// Atomically increment a counter and return the new value.
    async fn incr(&self, key: &StoreKey) -> Result<u64, StratosError>;

    /// Atomically admit-and-increment against a limit.
    ///
    /// Returns `true` (and increments) iff the current count is below
    /// `limit`. Returns `false` without mutating otherwise.
    async fn admit(&self, key: &StoreKey, limit: u64) -> Result<bool, StratosError>;

    /// Enumerate all live keys in a namespace.
    async fn scan(&self, class: KeyClass) -> Result<Vec<StoreKey>, StratosError>;
}

/// Administrator-status lookup (external directory).
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Whether the user is flagged administrator.
    async fn is_admin(&self, user: UserId) -> Result<bool, StratosError>;
}

/// One-time access grant bookkeeping.
///
/// A grant is a single-purchase entitlement: one report plus a fixed
/// number of follow-ups. Only the quota engine drives mutation.
#[async_trait]
pub trait OneTimeGrants: Send + Sync {
    /// Upsert a fresh grant for the user (repurchase resets prior state).
    async fn grant(&self, user: UserId) -> Result<(), StratosError>;

    /// Follow-ups still available on an active grant.
    ///
    /// A missing, consumed, or exhausted grant reads as 0.
    async fn remaining_follow_ups(&self, user: UserId) -> Result<u32, StratosError>;

    /// Consume one follow-up. Implementations clamp at zero.
    async fn consume_follow_up(&self, user: UserId) -> Result<(), StratosError>;
}

/// Opaque text-generation capability.
///
/// Driven by the serving path and the pre-warm job. Timeout policy belongs
/// to the implementation.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Generate report text for a prompt at the given model tier.
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_tokens: u32,
    ) -> Result<String, StratosError>;
}

/// Write-only sink for processed-query records.
#[async_trait]
pub trait QueryLog: Send + Sync {
    /// Append one record. Records are never mutated or deleted.
    async fn append(&self, record: &QueryRecord) -> Result<(), StratosError>;
}
