// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The batch pre-warm pass.
//!
//! Generates reports for the most-asked queries ahead of demand and caches
//! them under the shared system fingerprint at an extended TTL. Generation
//! failures skip the query and continue; a store failure aborts the run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use stratos_cache::{FrequencyTracker, ResponseCache};
use stratos_core::{Fingerprint, ModelTier, ReportGenerator, StratosError};

/// Tuning for a pre-warm pass.
#[derive(Debug, Clone, Copy)]
pub struct PrewarmOptions {
    /// How many of the most frequent queries to warm.
    pub top_n: usize,
    /// Model tier for warmed reports.
    pub tier: ModelTier,
    /// Token budget per report.
    pub max_tokens: u32,
}

impl Default for PrewarmOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            tier: ModelTier::Premium,
            max_tokens: 2048,
        }
    }
}

/// What one pre-warm pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrewarmSummary {
    /// Queries selected by popularity.
    pub selected: usize,
    /// Skipped because a live cache entry already existed.
    pub already_cached: usize,
    /// Freshly generated and cached.
    pub warmed: usize,
    /// Generation failed; skipped and continued.
    pub failed: usize,
}

/// Pre-warm job over the frequency tracker, cache, and generator.
#[derive(Clone)]
pub struct PrewarmJob {
    frequency: FrequencyTracker,
    cache: ResponseCache,
    generator: Arc<dyn ReportGenerator>,
    options: PrewarmOptions,
}

impl PrewarmJob {
    pub fn new(
        frequency: FrequencyTracker,
        cache: ResponseCache,
        generator: Arc<dyn ReportGenerator>,
        options: PrewarmOptions,
    ) -> Self {
        Self {
            frequency,
            cache,
            generator,
            options,
        }
    }

    /// Run one pre-warm pass.
    pub async fn run(&self) -> Result<PrewarmSummary, StratosError> {
        let popular = self.frequency.top(self.options.top_n).await?;
        let mut summary = PrewarmSummary {
            selected: popular.len(),
            ..PrewarmSummary::default()
        };

        for entry in popular {
            let fingerprint = Fingerprint::shared(&entry.query);
            if self.cache.cached_report(&fingerprint).await?.is_some() {
                debug!(query = entry.query, "already warm, skipping");
                summary.already_cached += 1;
                continue;
            }
            match self
                .generator
                .generate(&entry.query, self.options.tier, self.options.max_tokens)
                .await
            {
                Ok(report) => {
                    self.cache.store_prewarmed(&fingerprint, &report).await?;
                    summary.warmed += 1;
                }
                Err(err) => {
                    warn!(query = entry.query, error = %err, "pre-warm generation failed, skipping");
                    summary.failed += 1;
                }
            }
        }

        info!(
            selected = summary.selected,
            warmed = summary.warmed,
            already_cached = summary.already_cached,
            failed = summary.failed,
            "pre-warm pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratos_cache::CacheTtls;
    use stratos_core::KeyValueStore;
    use stratos_test_utils::{MemoryKv, ScriptedGenerator};

    struct Harness {
        tracker: FrequencyTracker,
        cache: ResponseCache,
        generator: Arc<ScriptedGenerator>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryKv::new()) as Arc<dyn KeyValueStore>;
        Harness {
            tracker: FrequencyTracker::new(Arc::clone(&store)),
            cache: ResponseCache::new(store, CacheTtls::default()),
            generator: Arc::new(ScriptedGenerator::new()),
        }
    }

    fn job(h: &Harness, top_n: usize) -> PrewarmJob {
        PrewarmJob::new(
            h.tracker.clone(),
            h.cache.clone(),
            Arc::clone(&h.generator) as Arc<dyn ReportGenerator>,
            PrewarmOptions {
                top_n,
                ..PrewarmOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn warms_top_queries_under_shared_fingerprint() {
        let h = harness();
        for _ in 0..3 {
            h.tracker.record("pricing strategy").await.unwrap();
        }
        h.tracker.record("rare question").await.unwrap();

        let summary = job(&h, 1).run().await.unwrap();
        assert_eq!(summary.selected, 1);
        assert_eq!(summary.warmed, 1);
        assert_eq!(h.generator.calls(), 1);

        let cached = h
            .cache
            .cached_report(&Fingerprint::shared("Pricing strategy"))
            .await
            .unwrap();
        assert!(cached.is_some());
        // The unselected query stays cold.
        assert!(h
            .cache
            .cached_report(&Fingerprint::shared("Rare question"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn already_cached_queries_are_not_regenerated() {
        let h = harness();
        h.tracker.record("pricing strategy").await.unwrap();
        h.cache
            .store_prewarmed(&Fingerprint::shared("Pricing strategy"), "warm")
            .await
            .unwrap();

        let summary = job(&h, 5).run().await.unwrap();
        assert_eq!(summary.already_cached, 1);
        assert_eq!(summary.warmed, 0);
        assert_eq!(h.generator.calls(), 0);
    }

    #[tokio::test]
    async fn generation_failure_skips_and_continues() {
        let h = harness();
        for _ in 0..2 {
            h.tracker.record("doomed query").await.unwrap();
        }
        h.tracker.record("healthy query").await.unwrap();
        h.generator.fail_on("Doomed");

        let summary = job(&h, 5).run().await.unwrap();
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.warmed, 1);

        assert!(h
            .cache
            .cached_report(&Fingerprint::shared("Healthy query"))
            .await
            .unwrap()
            .is_some());
        assert!(h
            .cache
            .cached_report(&Fingerprint::shared("Doomed query"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn empty_frequency_table_is_a_clean_no_op() {
        let h = harness();
        let summary = job(&h, 5).run().await.unwrap();
        assert_eq!(summary, PrewarmSummary::default());
        assert_eq!(h.generator.calls(), 0);
    }
}
