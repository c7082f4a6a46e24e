// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `KeyValueStore` fake.
//!
//! Admission atomicity comes from holding the map mutex across the whole
//! read-check-increment sequence, mirroring what the SQLite adapter gets
//! from its single background thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use stratos_core::{KeyClass, KeyValueStore, StoreKey, StratosError};

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn live(&self) -> bool {
        self.expires_at.is_none_or(|at| at > Instant::now())
    }
}

/// Mutex-guarded in-memory store with TTL and fault injection.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle "store down" mode: every operation fails with a store error.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StratosError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StratosError::store(std::io::Error::other(
                "key-value store unavailable",
            )));
        }
        Ok(())
    }

    /// Live value for a key, dropping it from the map if expired.
    fn live_value(entries: &mut HashMap<String, Entry>, key: &str) -> Option<String> {
        match entries.get(key) {
            Some(entry) if entry.live() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn parse_count(value: Option<String>) -> u64 {
        value.and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn fetch(&self, key: &StoreKey) -> Result<Option<String>, StratosError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live_value(&mut entries, key.as_str()))
    }

    async fn store(
        &self,
        key: &StoreKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StratosError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.as_str().to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> Result<(), StratosError> {
        self.check_available()?;
        self.entries.lock().unwrap().remove(key.as_str());
        Ok(())
    }

    async fn counter(&self, key: &StoreKey) -> Result<u64, StratosError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let value = Self::live_value(&mut entries, key.as_str());
        Ok(Self::parse_count(value))
    }

    async fn incr(&self, key: &StoreKey) -> Result<u64, StratosError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let expires_at = entries
            .get(key.as_str())
            .filter(|e| e.live())
            .and_then(|e| e.expires_at);
        let next = Self::parse_count(Self::live_value(&mut entries, key.as_str())) + 1;
        entries.insert(
            key.as_str().to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn admit(&self, key: &StoreKey, limit: u64) -> Result<bool, StratosError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let expires_at = entries
            .get(key.as_str())
            .filter(|e| e.live())
            .and_then(|e| e.expires_at);
        let count = Self::parse_count(Self::live_value(&mut entries, key.as_str()));
        if count >= limit {
            return Ok(false);
        }
        entries.insert(
            key.as_str().to_string(),
            Entry {
                value: (count + 1).to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn scan(&self, class: KeyClass) -> Result<Vec<StoreKey>, StratosError> {
        self.check_available()?;
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<StoreKey> = entries
            .iter()
            .filter(|(_, entry)| entry.live())
            .filter_map(|(k, _)| StoreKey::from_stored(class, k.clone()))
            .collect();
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(keys)
    }
}
