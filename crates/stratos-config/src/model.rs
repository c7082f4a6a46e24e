// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Stratos core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use stratos_core::ModelTier;
use stratos_plans::Plan;

/// Top-level Stratos configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; the plan catalog defaults to the built-in one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StratosConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// TTL policy per cache entry class.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch pre-warm job settings.
    #[serde(default)]
    pub prewarm: PrewarmConfig,

    /// Report generation endpoint settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Plan catalog, first entry is the default tier.
    #[serde(default = "stratos_plans::builtin_catalog")]
    pub plans: Vec<Plan>,
}

impl Default for StratosConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            prewarm: PrewarmConfig::default(),
            generation: GenerationConfig::default(),
            plans: stratos_plans::builtin_catalog(),
        }
    }
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "stratos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("stratos").join("stratos.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("stratos.db"))
        .to_string_lossy()
        .into_owned()
}

/// TTL policy per cache entry class, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// UI session payloads.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Per-user conversation-continuity records.
    #[serde(default = "default_ai_memory_ttl")]
    pub ai_memory_ttl_secs: u64,

    /// Fingerprint-keyed report cache entries.
    #[serde(default = "default_report_ttl")]
    pub report_ttl_secs: u64,

    /// Batch pre-warmed report entries (longer, to amortize popular queries).
    #[serde(default = "default_prewarm_ttl")]
    pub prewarm_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            ai_memory_ttl_secs: default_ai_memory_ttl(),
            report_ttl_secs: default_report_ttl(),
            prewarm_ttl_secs: default_prewarm_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn ai_memory_ttl(&self) -> Duration {
        Duration::from_secs(self.ai_memory_ttl_secs)
    }

    pub fn report_ttl(&self) -> Duration {
        Duration::from_secs(self.report_ttl_secs)
    }

    pub fn prewarm_ttl(&self) -> Duration {
        Duration::from_secs(self.prewarm_ttl_secs)
    }
}

fn default_session_ttl() -> u64 {
    3600 // 1h
}

fn default_ai_memory_ttl() -> u64 {
    86_400 // 24h
}

fn default_report_ttl() -> u64 {
    86_400 // 24h
}

fn default_prewarm_ttl() -> u64 {
    259_200 // 72h
}

/// Batch pre-warm job configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrewarmConfig {
    /// Cron expression for the daily run.
    #[serde(default = "default_prewarm_schedule")]
    pub schedule: String,

    /// How many of the most frequent queries to warm per run.
    #[serde(default = "default_prewarm_top_n")]
    pub top_n: u32,

    /// Model tier used for warmed reports.
    #[serde(default = "default_prewarm_tier")]
    pub model_tier: ModelTier,

    /// Token budget per warmed report.
    #[serde(default = "default_prewarm_max_tokens")]
    pub max_tokens: u32,
}

impl Default for PrewarmConfig {
    fn default() -> Self {
        Self {
            schedule: default_prewarm_schedule(),
            top_n: default_prewarm_top_n(),
            model_tier: default_prewarm_tier(),
            max_tokens: default_prewarm_max_tokens(),
        }
    }
}

fn default_prewarm_schedule() -> String {
    // Daily at 03:00, the service's quietest hour.
    "0 3 * * *".to_string()
}

fn default_prewarm_top_n() -> u32 {
    5
}

fn default_prewarm_tier() -> ModelTier {
    ModelTier::Premium
}

fn default_prewarm_max_tokens() -> u32 {
    2048
}

/// Report generation endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat-completions endpoint base URL.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier behind `ModelTier::Standard`.
    #[serde(default = "default_standard_model")]
    pub standard_model: String,

    /// Model identifier behind `ModelTier::Premium`.
    #[serde(default = "default_premium_model")]
    pub premium_model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generation_base_url(),
            standard_model: default_standard_model(),
            premium_model: default_premium_model(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl GenerationConfig {
    /// Model identifier for a tier.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Premium => &self.premium_model,
        }
    }
}

fn default_generation_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_standard_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_premium_model() -> String {
    "gpt-4o".to_string()
}

fn default_generation_timeout() -> u64 {
    120
}
