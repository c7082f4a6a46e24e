// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring.
//!
//! Every collaborator is constructed here, once, from configuration, and
//! handed to commands as explicit handles. There is no process-global
//! client state; tests assemble the same components over in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use stratos_cache::{CacheTtls, FrequencyTracker, ResponseCache};
use stratos_config::StratosConfig;
use stratos_core::{
    AdminDirectory, KeyValueStore, OneTimeGrants, ReportGenerator, StratosError,
};
use stratos_generate::{GenerationOptions, ReportClient};
use stratos_plans::PlanRegistry;
use stratos_quota::{QuotaEngine, UsageResetJob};
use stratos_storage::{Database, GrantStore, QueryLogStore, SqliteKv, UserDirectory};

/// The assembled service core.
pub struct App {
    db: Database,
    pub store: Arc<dyn KeyValueStore>,
    pub users: UserDirectory,
    pub registry: Arc<PlanRegistry>,
    pub cache: ResponseCache,
    pub frequency: FrequencyTracker,
    pub quota: QuotaEngine,
    pub reset: UsageResetJob,
    pub query_log: QueryLogStore,
}

impl App {
    /// Open storage and wire all components from configuration.
    pub async fn open(config: &StratosConfig) -> Result<Self, StratosError> {
        let db = Database::open(&config.storage.database_path).await?;
        Self::assemble(db, config)
    }

    /// Wiring over an already-open database (tests use in-memory).
    pub fn assemble(db: Database, config: &StratosConfig) -> Result<Self, StratosError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKv::new(db.clone()));
        let users = UserDirectory::new(db.clone());
        let grants: Arc<dyn OneTimeGrants> = Arc::new(GrantStore::new(db.clone()));
        let registry = Arc::new(PlanRegistry::from_plans(config.plans.clone())?);

        let ttls = CacheTtls {
            session: config.cache.session_ttl(),
            ai_memory: config.cache.ai_memory_ttl(),
            report: config.cache.report_ttl(),
            prewarm: config.cache.prewarm_ttl(),
        };
        let cache = ResponseCache::new(Arc::clone(&store), ttls);
        let frequency = FrequencyTracker::new(Arc::clone(&store));
        let admins: Arc<dyn AdminDirectory> = Arc::new(users.clone());
        let quota = QuotaEngine::new(
            Arc::clone(&store),
            admins,
            grants,
            Arc::clone(&registry),
        );
        let reset = UsageResetJob::new(Arc::clone(&store));
        let query_log = QueryLogStore::new(db.clone());

        Ok(Self {
            db,
            store,
            users,
            registry,
            cache,
            frequency,
            quota,
            reset,
            query_log,
        })
    }

    /// Build the generation client; requires an API key in config or env.
    pub fn generator(&self, config: &StratosConfig) -> Result<Arc<dyn ReportGenerator>, StratosError> {
        let api_key = config
            .generation
            .api_key
            .clone()
            .ok_or_else(|| {
                StratosError::Config(
                    "generation.api_key is not set (or STRATOS_GENERATION_API_KEY)".to_string(),
                )
            })?;
        let client = ReportClient::new(GenerationOptions {
            api_key,
            base_url: config.generation.base_url.clone(),
            standard_model: config.generation.standard_model.clone(),
            premium_model: config.generation.premium_model.clone(),
            timeout: Duration::from_secs(config.generation.timeout_secs),
        })?;
        Ok(Arc::new(client))
    }

    /// Flush and close the underlying database.
    pub async fn close(self) -> Result<(), StratosError> {
        self.db.close().await
    }
}
