// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use tracing::debug;

use stratos_core::StratosError;

use crate::migrations;

/// Convert a tokio-rusqlite error into `StratosError::Store`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StratosError {
    StratosError::Store {
        source: Box::new(e),
    }
}

/// Shared SQLite database handle.
///
/// Cloning is cheap: clones share the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, applying PRAGMAs and
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, StratosError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StratosError::Store {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure(true).await?;
        migrations::apply(&db).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database (tests and ephemeral tooling).
    pub async fn open_in_memory() -> Result<Self, StratosError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| StratosError::Store {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        // WAL is meaningless for in-memory databases.
        db.configure(false).await?;
        migrations::apply(&db).await?;
        Ok(db)
    }

    async fn configure(&self, wal: bool) -> Result<(), StratosError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA synchronous=NORMAL;
                     PRAGMA foreign_keys=ON;
                     PRAGMA busy_timeout=5000;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush before shutdown.
    pub async fn close(&self) -> Result<(), StratosError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
