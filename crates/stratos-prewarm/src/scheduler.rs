// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven scheduling of the pre-warm job.

use chrono::{DateTime, Local};
use croner::Cron;
use tracing::{error, info};

use stratos_core::StratosError;

use crate::job::PrewarmJob;

/// Runs the pre-warm job on a cron schedule.
pub struct PrewarmScheduler {
    job: PrewarmJob,
    cron: Cron,
}

impl std::fmt::Debug for PrewarmScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrewarmScheduler")
            .finish_non_exhaustive()
    }
}

impl PrewarmScheduler {
    /// Build a scheduler from a standard 5-field cron expression.
    pub fn new(job: PrewarmJob, schedule: &str) -> Result<Self, StratosError> {
        let cron = schedule
            .parse::<Cron>()
            .map_err(|e| StratosError::Config(format!("invalid cron schedule `{schedule}`: {e}")))?;
        Ok(Self { job, cron })
    }

    /// The next scheduled run after now.
    pub fn next_run(&self) -> Result<DateTime<Local>, StratosError> {
        self.cron
            .find_next_occurrence(&Local::now(), false)
            .map_err(|e| StratosError::Internal(format!("cron evaluation: {e}")))
    }

    /// Sleep-until-due loop. A failed pass is logged and the schedule
    /// continues; only cron evaluation itself aborts the loop.
    pub async fn run_forever(&self) -> Result<(), StratosError> {
        loop {
            let next = self.next_run()?;
            let wait = (next - Local::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            info!(next = %next, "pre-warm pass scheduled");
            tokio::time::sleep(wait).await;
            if let Err(err) = self.job.run().await {
                error!(error = %err, "pre-warm pass failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stratos_cache::{CacheTtls, FrequencyTracker, ResponseCache};
    use stratos_core::{KeyValueStore, ReportGenerator};
    use stratos_test_utils::{MemoryKv, ScriptedGenerator};

    use crate::job::PrewarmOptions;

    fn job() -> PrewarmJob {
        let store = Arc::new(MemoryKv::new()) as Arc<dyn KeyValueStore>;
        PrewarmJob::new(
            FrequencyTracker::new(Arc::clone(&store)),
            ResponseCache::new(store, CacheTtls::default()),
            Arc::new(ScriptedGenerator::new()) as Arc<dyn ReportGenerator>,
            PrewarmOptions::default(),
        )
    }

    #[test]
    fn accepts_daily_three_am_schedule() {
        let scheduler = PrewarmScheduler::new(job(), "0 3 * * *").unwrap();
        let next = scheduler.next_run().unwrap();
        assert!(next > Local::now());
        assert_eq!(next.format("%H:%M").to_string(), "03:00");
    }

    #[test]
    fn rejects_malformed_schedule() {
        let err = PrewarmScheduler::new(job(), "every day at 3am").unwrap_err();
        assert!(matches!(err, StratosError::Config(_)));
    }
}
