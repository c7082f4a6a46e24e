// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic usage reset.
//!
//! Zeroes every per-user usage counter by removing it from the store; the
//! get-or-zero counter contract makes an absent counter read as 0. Grants,
//! cache entries, and frequency counters live in other namespaces and are
//! untouched.

use std::sync::Arc;

use tracing::info;

use stratos_core::{KeyClass, KeyValueStore, StratosError};

/// What a reset run removed, per namespace.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResetSummary {
    pub query_counters: usize,
    pub follow_up_counters: usize,
    pub document_counters: usize,
}

impl ResetSummary {
    pub fn total(&self) -> usize {
        self.query_counters + self.follow_up_counters + self.document_counters
    }
}

/// The scheduled reset boundary of the quota ledger.
#[derive(Clone)]
pub struct UsageResetJob {
    store: Arc<dyn KeyValueStore>,
}

impl UsageResetJob {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reset all known per-user counters to zero. Idempotent.
    pub async fn run(&self) -> Result<ResetSummary, StratosError> {
        let mut summary = ResetSummary::default();
        for class in KeyClass::usage_counters() {
            let keys = self.store.scan(class).await?;
            let removed = keys.len();
            for key in keys {
                self.store.remove(&key).await?;
            }
            match class {
                KeyClass::QueryCount => summary.query_counters = removed,
                KeyClass::FollowUpCount => summary.follow_up_counters = removed,
                KeyClass::DocumentCount => summary.document_counters = removed,
                _ => {}
            }
        }
        info!(
            query_counters = summary.query_counters,
            follow_up_counters = summary.follow_up_counters,
            document_counters = summary.document_counters,
            "usage counters reset"
        );
        Ok(summary)
    }
}
