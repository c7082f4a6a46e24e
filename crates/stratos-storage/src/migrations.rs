// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned schema migrations tracked via `PRAGMA user_version`.
//!
//! Each entry runs once, in order, inside its own transaction. Append new
//! migrations; never edit a shipped one.

use tracing::info;

use stratos_core::StratosError;

use crate::database::{map_tr_err, Database};

/// Ordered migration scripts. `user_version` after applying entry `i` is `i + 1`.
const MIGRATIONS: &[&str] = &[
    // V1: KV substrate, user directory, one-time grants, query log.
    "CREATE TABLE kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        expires_at INTEGER
    );
    CREATE INDEX idx_kv_expires ON kv(expires_at);

    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        plan TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE one_time_grants (
        user_id INTEGER PRIMARY KEY NOT NULL,
        used INTEGER NOT NULL DEFAULT 0,
        follow_ups_remaining INTEGER NOT NULL DEFAULT 2
    );

    CREATE TABLE query_log (
        id TEXT PRIMARY KEY NOT NULL,
        user_id INTEGER NOT NULL,
        query TEXT NOT NULL,
        response TEXT NOT NULL,
        plan TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_query_log_user ON query_log(user_id);
    CREATE INDEX idx_query_log_created ON query_log(created_at);",
];

/// Apply all pending migrations.
pub async fn apply(db: &Database) -> Result<(), StratosError> {
    let applied = db
        .connection()
        .call(|conn| -> Result<Vec<i64>, rusqlite::Error> {
            let mut applied = Vec::new();
            let current: i64 =
                conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
            for (i, script) in MIGRATIONS.iter().enumerate() {
                let version = (i + 1) as i64;
                if version <= current {
                    continue;
                }
                let tx = conn.transaction()?;
                tx.execute_batch(script)?;
                tx.pragma_update(None, "user_version", version)?;
                tx.commit()?;
                applied.push(version);
            }
            Ok(applied)
        })
        .await
        .map_err(map_tr_err)?;

    for version in applied {
        info!(version, "applied schema migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn apply_sets_user_version() {
        let db = Database::open_in_memory().await.unwrap();
        let version: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("PRAGMA user_version", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn apply_twice_is_a_no_op() {
        let db = Database::open_in_memory().await.unwrap();
        // open_in_memory already applied; a second run must not error.
        apply(&db).await.unwrap();
    }
}
