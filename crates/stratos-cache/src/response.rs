// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL response cache over the shared key-value store.
//!
//! Covers three entry classes: fingerprint-keyed report text, per-user
//! session payloads, and per-user AI-memory records. Session and memory
//! reads are self-healing: a payload that no longer parses is deleted on
//! read so the next write starts clean.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use stratos_core::{Fingerprint, KeyValueStore, StoreKey, StratosError, UserId};

/// TTL policy per entry class.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub session: Duration,
    pub ai_memory: Duration,
    pub report: Duration,
    pub prewarm: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            session: Duration::from_secs(3600),
            ai_memory: Duration::from_secs(86_400),
            report: Duration::from_secs(86_400),
            prewarm: Duration::from_secs(259_200),
        }
    }
}

/// A query/response pair carried across turns for follow-up continuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub query: String,
    pub response: String,
}

/// Response cache front-end.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    ttls: CacheTtls,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    /// Cached report text for a fingerprint, if a live entry exists.
    pub async fn cached_report(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<String>, StratosError> {
        self.store.fetch(&StoreKey::report(fingerprint)).await
    }

    /// Cache report text at the standard report TTL.
    pub async fn store_report(
        &self,
        fingerprint: &Fingerprint,
        text: &str,
    ) -> Result<(), StratosError> {
        self.store
            .store(&StoreKey::report(fingerprint), text, Some(self.ttls.report))
            .await
    }

    /// Cache pre-warmed report text at the extended pre-warm TTL.
    pub async fn store_prewarmed(
        &self,
        fingerprint: &Fingerprint,
        text: &str,
    ) -> Result<(), StratosError> {
        self.store
            .store(&StoreKey::report(fingerprint), text, Some(self.ttls.prewarm))
            .await
    }

    /// Drop a report entry, if present.
    pub async fn invalidate_report(&self, fingerprint: &Fingerprint) -> Result<(), StratosError> {
        self.store.remove(&StoreKey::report(fingerprint)).await
    }

    /// Cached follow-up text for a fingerprint, if a live entry exists.
    pub async fn cached_follow_up(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<String>, StratosError> {
        self.store.fetch(&StoreKey::follow_up(fingerprint)).await
    }

    /// Cache follow-up text at the standard report TTL.
    pub async fn store_follow_up(
        &self,
        fingerprint: &Fingerprint,
        text: &str,
    ) -> Result<(), StratosError> {
        self.store
            .store(&StoreKey::follow_up(fingerprint), text, Some(self.ttls.report))
            .await
    }

    /// Store a session payload for a user at the session TTL.
    pub async fn put_session(
        &self,
        user: UserId,
        payload: &serde_json::Value,
    ) -> Result<(), StratosError> {
        let encoded = payload.to_string();
        self.store
            .store(&StoreKey::session(user), &encoded, Some(self.ttls.session))
            .await
    }

    /// Retrieve a user's session payload.
    ///
    /// Self-healing like [`recall`](Self::recall): a payload that fails to
    /// parse reads as absent and is deleted.
    pub async fn session(&self, user: UserId) -> Result<Option<serde_json::Value>, StratosError> {
        let key = StoreKey::session(user);
        let Some(raw) = self.store.fetch(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(user = %user, error = %err, "corrupt session payload, removing");
                self.store.remove(&key).await?;
                Ok(None)
            }
        }
    }

    /// Store a user's AI-memory record at the memory TTL.
    pub async fn remember(
        &self,
        user: UserId,
        query: &str,
        response: &str,
    ) -> Result<(), StratosError> {
        let record = MemoryRecord {
            query: query.to_string(),
            response: response.to_string(),
        };
        let encoded = serde_json::to_string(&record)
            .map_err(|e| StratosError::Internal(format!("memory record encoding: {e}")))?;
        self.store
            .store(&StoreKey::ai_memory(user), &encoded, Some(self.ttls.ai_memory))
            .await
    }

    /// Retrieve a user's AI-memory record.
    ///
    /// Self-healing: a record that no longer parses is deleted so the next
    /// turn starts from a clean slate instead of failing repeatedly.
    pub async fn recall(&self, user: UserId) -> Result<Option<MemoryRecord>, StratosError> {
        let key = StoreKey::ai_memory(user);
        let Some(raw) = self.store.fetch(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(user = %user, error = %err, "corrupt ai-memory record, removing");
                self.store.remove(&key).await?;
                Ok(None)
            }
        }
    }
}
