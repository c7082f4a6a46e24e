// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only log of processed queries and follow-ups.

use async_trait::async_trait;
use rusqlite::params;

use stratos_core::{QueryLog, QueryRecord, StratosError, UserId};

use crate::database::{map_tr_err, Database};

/// SQLite-backed query log.
#[derive(Clone)]
pub struct QueryLogStore {
    db: Database,
}

impl QueryLogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of records logged for a user (reporting/tests).
    pub async fn count_for(&self, user: UserId) -> Result<u64, StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<u64, rusqlite::Error> {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM query_log WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Most recent records for a user, newest first.
    pub async fn recent_for(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<QueryRecord>, StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<QueryRecord>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, query, response, plan, created_at
                     FROM query_log WHERE user_id = ?1
                     ORDER BY created_at DESC LIMIT ?2",
                )?;
                let records = stmt
                    .query_map(params![user_id, limit], |row| {
                        Ok(QueryRecord {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            query: row.get(2)?,
                            response: row.get(3)?,
                            plan: row.get(4)?,
                            created_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl QueryLog for QueryLogStore {
    async fn append(&self, record: &QueryRecord) -> Result<(), StratosError> {
        let record = record.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO query_log (id, user_id, query, response, plan, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        record.user_id,
                        record.query,
                        record.response,
                        record.plan,
                        record.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
