// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-time access grants.
//!
//! A grant records a single-purchase entitlement: one report plus a fixed
//! number of follow-ups. Re-granting (repurchase) upserts the row back to
//! its fresh state. Only the quota engine mutates grants.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

use stratos_core::{OneTimeGrants, StratosError, UserId};

use crate::database::{map_tr_err, Database};

/// Follow-ups included with a fresh grant.
pub const GRANT_FOLLOW_UPS: i64 = 2;

/// A one-time access grant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeGrant {
    pub user_id: i64,
    pub used: bool,
    pub follow_ups_remaining: i64,
}

/// Store for one-time access grants.
#[derive(Clone)]
pub struct GrantStore {
    db: Database,
}

impl GrantStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert a fresh grant for the user: `used = false`, full follow-ups.
    ///
    /// Re-granting resets any prior state; this is intentional for
    /// repurchase.
    pub async fn grant(&self, user: UserId) -> Result<(), StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO one_time_grants (user_id, used, follow_ups_remaining)
                     VALUES (?1, 0, ?2)
                     ON CONFLICT(user_id) DO UPDATE SET
                       used = 0, follow_ups_remaining = ?2",
                    params![user_id, GRANT_FOLLOW_UPS],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        info!(user_id = %user, "one-time access granted");
        Ok(())
    }

    /// Fetch the grant row for a user, if any.
    pub async fn get(&self, user: UserId) -> Result<Option<OneTimeGrant>, StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<Option<OneTimeGrant>, rusqlite::Error> {
                conn.query_row(
                    "SELECT user_id, used, follow_ups_remaining
                     FROM one_time_grants WHERE user_id = ?1",
                    params![user_id],
                    |row| {
                        Ok(OneTimeGrant {
                            user_id: row.get(0)?,
                            used: row.get::<_, i64>(1)? != 0,
                            follow_ups_remaining: row.get(2)?,
                        })
                    },
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Follow-ups still available on an active grant.
    ///
    /// A missing grant, a consumed grant, or an exhausted grant all read
    /// as 0.
    pub async fn remaining_follow_ups(&self, user: UserId) -> Result<u32, StratosError> {
        Ok(match self.get(user).await? {
            Some(g) if !g.used && g.follow_ups_remaining > 0 => g.follow_ups_remaining as u32,
            _ => 0,
        })
    }

    /// Consume one follow-up from the grant.
    ///
    /// Clamps at zero: consuming with nothing remaining leaves the row at 0
    /// and logs a warning, since that indicates a caller skipped the
    /// admission check.
    pub async fn consume_follow_up(&self, user: UserId) -> Result<(), StratosError> {
        let user_id = user.0;
        let clamped = self
            .db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let remaining: Option<i64> = conn
                    .query_row(
                        "SELECT follow_ups_remaining FROM one_time_grants WHERE user_id = ?1",
                        params![user_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match remaining {
                    Some(n) if n > 0 => {
                        conn.execute(
                            "UPDATE one_time_grants
                             SET follow_ups_remaining = follow_ups_remaining - 1
                             WHERE user_id = ?1",
                            params![user_id],
                        )?;
                        Ok(false)
                    }
                    _ => Ok(true),
                }
            })
            .await
            .map_err(map_tr_err)?;

        if clamped {
            warn!(
                user_id = %user,
                "follow-up consumed with none remaining; clamped at zero"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl OneTimeGrants for GrantStore {
    async fn grant(&self, user: UserId) -> Result<(), StratosError> {
        GrantStore::grant(self, user).await
    }

    async fn remaining_follow_ups(&self, user: UserId) -> Result<u32, StratosError> {
        GrantStore::remaining_follow_ups(self, user).await
    }

    async fn consume_follow_up(&self, user: UserId) -> Result<(), StratosError> {
        GrantStore::consume_follow_up(self, user).await
    }
}
