// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global query popularity tracking.
//!
//! Counters are keyed by normalized query text and carry no TTL:
//! popularity accumulates across usage-reset cycles and feeds the batch
//! pre-warm job's top-N selection.

use std::sync::Arc;

use tracing::debug;

use stratos_core::{KeyClass, KeyValueStore, StoreKey, StratosError};

use crate::normalize::normalize_query;

/// A query and its accumulated ask count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularQuery {
    pub query: String,
    pub count: u64,
}

/// Frequency tracker over the shared key-value store.
#[derive(Clone)]
pub struct FrequencyTracker {
    store: Arc<dyn KeyValueStore>,
}

impl FrequencyTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record one ask of a query.
    ///
    /// The raw text is normalized first so phrasing variants share a
    /// counter. Queries that normalize to the empty string are not
    /// trackable and are skipped.
    pub async fn record(&self, raw_query: &str) -> Result<(), StratosError> {
        let normalized = normalize_query(raw_query);
        if normalized.is_empty() {
            debug!(raw = raw_query, "query normalized to empty, not tracked");
            return Ok(());
        }
        self.store.incr(&StoreKey::frequency(&normalized)).await?;
        Ok(())
    }

    /// The `n` most-asked queries, most popular first.
    ///
    /// Ties break on query text ascending so the selection is
    /// deterministic run to run.
    pub async fn top(&self, n: usize) -> Result<Vec<PopularQuery>, StratosError> {
        let keys = self.store.scan(KeyClass::QueryFrequency).await?;
        let mut ranked = Vec::with_capacity(keys.len());
        for key in keys {
            let count = self.store.counter(&key).await?;
            ranked.push(PopularQuery {
                query: key.suffix().to_string(),
                count,
            });
        }
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        ranked.truncate(n);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratos_test_utils::MemoryKv;

    fn tracker_over(store: Arc<MemoryKv>) -> FrequencyTracker {
        FrequencyTracker::new(store)
    }

    #[tokio::test]
    async fn phrasing_variants_share_a_counter() {
        let store = Arc::new(MemoryKv::new());
        let tracker = tracker_over(store);
        tracker.record("hi market sizing for fintech").await.unwrap();
        tracker.record("Market   sizing for FINTECH").await.unwrap();

        let top = tracker.top(5).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query, "Market sizing for fintech");
        assert_eq!(top[0].count, 2);
    }

    #[tokio::test]
    async fn empty_normalization_is_skipped() {
        let store = Arc::new(MemoryKv::new());
        let tracker = tracker_over(store);
        tracker.record("hey thanks").await.unwrap();
        assert!(tracker.top(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_orders_by_count_then_text() {
        let store = Arc::new(MemoryKv::new());
        let tracker = tracker_over(store);
        for _ in 0..3 {
            tracker.record("pricing strategy").await.unwrap();
        }
        for _ in 0..2 {
            tracker.record("zebra markets").await.unwrap();
        }
        for _ in 0..2 {
            tracker.record("apple orchards").await.unwrap();
        }
        tracker.record("one off").await.unwrap();

        let top = tracker.top(3).await.unwrap();
        let names: Vec<&str> = top.iter().map(|p| p.query.as_str()).collect();
        // Tie between the two count-2 queries breaks alphabetically.
        assert_eq!(
            names,
            vec!["Pricing strategy", "Apple orchards", "Zebra markets"]
        );
    }

    #[tokio::test]
    async fn top_n_truncates() {
        let store = Arc::new(MemoryKv::new());
        let tracker = tracker_over(store);
        for q in ["a", "b", "c", "d", "e", "f"] {
            tracker.record(q).await.unwrap();
        }
        assert_eq!(tracker.top(5).await.unwrap().len(), 5);
        assert_eq!(tracker.top(0).await.unwrap().len(), 0);
    }
}
