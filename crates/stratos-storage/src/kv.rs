// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `KeyValueStore` trait.
//!
//! Entries carry an optional `expires_at` (epoch seconds); expired rows read
//! as absent and are purged lazily on access. Every operation runs inside a
//! single `conn.call` on the one background thread, so read-check-increment
//! sequences are atomic with respect to concurrent callers -- this is the
//! property the quota engine's admission relies on.

use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use stratos_core::{KeyClass, KeyValueStore, StoreKey, StratosError};

use crate::database::{map_tr_err, Database};

/// SQLite-backed key-value store.
#[derive(Clone)]
pub struct SqliteKv {
    db: Database,
}

/// Read the live value of a key, purging it if expired.
///
/// Returns `(value, expires_at)` for a live row, `None` otherwise.
fn read_live(
    conn: &rusqlite::Connection,
    key: &str,
    now: i64,
) -> Result<Option<(String, Option<i64>)>, rusqlite::Error> {
    let row: Option<(String, Option<i64>)> = conn
        .query_row(
            "SELECT value, expires_at FROM kv WHERE key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match row {
        Some((_, Some(expires))) if expires <= now => {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(None)
        }
        live => Ok(live),
    }
}

/// Parse a stored counter value defensively: non-numeric reads as 0.
fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

impl SqliteKv {
    /// Create a store over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Purge every expired row. Returns the number of rows removed.
    ///
    /// Expiry is otherwise lazy (on access); this exists for periodic
    /// housekeeping so abandoned keys do not accumulate.
    pub async fn purge_expired(&self) -> Result<u64, StratosError> {
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<u64, rusqlite::Error> {
                let purged = conn.execute(
                    "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    params![now],
                )?;
                Ok(purged as u64)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    async fn fetch(&self, key: &StoreKey) -> Result<Option<String>, StratosError> {
        let key = key.as_str().to_string();
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                Ok(read_live(conn, &key, now)?.map(|(value, _)| value))
            })
            .await
            .map_err(map_tr_err)
    }

    async fn store(
        &self,
        key: &StoreKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StratosError> {
        let key = key.as_str().to_string();
        let value = value.to_string();
        let expires_at = ttl.map(|d| now_epoch() + d.as_secs() as i64);
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                       value = excluded.value, expires_at = excluded.expires_at",
                    params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn remove(&self, key: &StoreKey) -> Result<(), StratosError> {
        let key = key.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn counter(&self, key: &StoreKey) -> Result<u64, StratosError> {
        let key = key.as_str().to_string();
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<u64, rusqlite::Error> {
                let live = read_live(conn, &key, now)?;
                Ok(parse_count(live.as_ref().map(|(v, _)| v.as_str())))
            })
            .await
            .map_err(map_tr_err)
    }

    async fn incr(&self, key: &StoreKey) -> Result<u64, StratosError> {
        let key = key.as_str().to_string();
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<u64, rusqlite::Error> {
                let live = read_live(conn, &key, now)?;
                let expires_at = live.as_ref().and_then(|(_, e)| *e);
                let next = parse_count(live.as_ref().map(|(v, _)| v.as_str())) + 1;
                conn.execute(
                    "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                       value = excluded.value, expires_at = excluded.expires_at",
                    params![key, next.to_string(), expires_at],
                )?;
                Ok(next)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn admit(&self, key: &StoreKey, limit: u64) -> Result<bool, StratosError> {
        let key = key.as_str().to_string();
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let live = read_live(conn, &key, now)?;
                let expires_at = live.as_ref().and_then(|(_, e)| *e);
                let count = parse_count(live.as_ref().map(|(v, _)| v.as_str()));
                if count >= limit {
                    return Ok(false);
                }
                conn.execute(
                    "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                       value = excluded.value, expires_at = excluded.expires_at",
                    params![key, (count + 1).to_string(), expires_at],
                )?;
                Ok(true)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn scan(&self, class: KeyClass) -> Result<Vec<StoreKey>, StratosError> {
        let pattern = format!("{}:%", class.prefix());
        let now = now_epoch();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv WHERE key LIKE ?1
                     AND (expires_at IS NULL OR expires_at > ?2)
                     ORDER BY key ASC",
                )?;
                let keys = stmt
                    .query_map(params![pattern, now], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(map_tr_err)
            // LIKE `_` matches any character, so the pattern can overmatch
            // across namespaces; from_stored re-validates the exact prefix.
            .map(|keys| {
                keys.into_iter()
                    .filter_map(|k| StoreKey::from_stored(class, k))
                    .collect()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratos_core::{ServiceKind, UserId};

    async fn kv() -> SqliteKv {
        SqliteKv::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn store_and_fetch_round_trip() {
        let kv = kv().await;
        let key = StoreKey::session(UserId(1));
        kv.store(&key, r#"{"archetype":"visionary"}"#, Some(Duration::from_secs(3600)))
            .await
            .unwrap();
        let value = kv.fetch(&key).await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"archetype":"visionary"}"#));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss_and_is_purged() {
        let kv = kv().await;
        let key = StoreKey::session(UserId(2));
        kv.store(&key, "stale", Some(Duration::ZERO)).await.unwrap();

        assert_eq!(kv.fetch(&key).await.unwrap(), None);

        // The lazy purge removed the row entirely.
        let remaining: i64 = kv
            .db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn counter_reads_absent_as_zero() {
        let kv = kv().await;
        let key = StoreKey::usage(UserId(3), ServiceKind::Queries);
        assert_eq!(kv.counter(&key).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counter_reads_garbage_as_zero() {
        let kv = kv().await;
        let key = StoreKey::usage(UserId(4), ServiceKind::Queries);
        kv.store(&key, "not-a-number", None).await.unwrap();
        assert_eq!(kv.counter(&key).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn incr_counts_up_from_zero() {
        let kv = kv().await;
        let key = StoreKey::usage(UserId(5), ServiceKind::FollowUps);
        assert_eq!(kv.incr(&key).await.unwrap(), 1);
        assert_eq!(kv.incr(&key).await.unwrap(), 2);
        assert_eq!(kv.counter(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn admit_allows_until_limit() {
        let kv = kv().await;
        let key = StoreKey::usage(UserId(6), ServiceKind::Queries);
        for _ in 0..3 {
            assert!(kv.admit(&key, 3).await.unwrap());
        }
        assert!(!kv.admit(&key, 3).await.unwrap());
        // Denial did not mutate the counter.
        assert_eq!(kv.counter(&key).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn admit_is_atomic_under_concurrency() {
        let kv = kv().await;
        let user = UserId(7);
        // Seed the counter at limit - 1.
        for _ in 0..2 {
            assert!(kv
                .admit(&StoreKey::usage(user, ServiceKind::Queries), 3)
                .await
                .unwrap());
        }

        let mut handles = Vec::new();
        for _ in 0..10 {
            let kv = kv.clone();
            handles.push(tokio::spawn(async move {
                kv.admit(&StoreKey::usage(user, ServiceKind::Queries), 3)
                    .await
                    .unwrap()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1, "exactly one concurrent caller may win");
        assert_eq!(
            kv.counter(&StoreKey::usage(user, ServiceKind::Queries))
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn scan_is_namespace_scoped_and_skips_expired() {
        let kv = kv().await;
        kv.store(&StoreKey::frequency("growth plan"), "4", None)
            .await
            .unwrap();
        kv.store(&StoreKey::frequency("exit strategy"), "2", None)
            .await
            .unwrap();
        kv.store(
            &StoreKey::frequency("stale query"),
            "9",
            Some(Duration::ZERO),
        )
        .await
        .unwrap();
        kv.store(&StoreKey::session(UserId(1)), "{}", None)
            .await
            .unwrap();
        kv.incr(&StoreKey::usage(UserId(1), ServiceKind::Queries))
            .await
            .unwrap();

        let keys = kv.scan(KeyClass::QueryFrequency).await.unwrap();
        let suffixes: Vec<&str> = keys.iter().map(|k| k.suffix()).collect();
        assert_eq!(suffixes, vec!["exit strategy", "growth plan"]);
    }

    #[tokio::test]
    async fn remove_absent_key_is_ok() {
        let kv = kv().await;
        kv.remove(&StoreKey::session(UserId(99))).await.unwrap();
    }

    #[tokio::test]
    async fn purge_expired_sweeps_rows() {
        let kv = kv().await;
        kv.store(&StoreKey::session(UserId(1)), "a", Some(Duration::ZERO))
            .await
            .unwrap();
        kv.store(&StoreKey::session(UserId(2)), "b", None)
            .await
            .unwrap();
        let purged = kv.purge_expired().await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(
            kv.fetch(&StoreKey::session(UserId(2))).await.unwrap(),
            Some("b".to_string())
        );
    }

    #[tokio::test]
    async fn store_overwrite_replaces_value_and_ttl() {
        let kv = kv().await;
        let key = StoreKey::session(UserId(8));
        kv.store(&key, "old", Some(Duration::ZERO)).await.unwrap();
        kv.store(&key, "new", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(kv.fetch(&key).await.unwrap().as_deref(), Some("new"));
    }
}
