// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `OneTimeGrants` fake.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use stratos_core::{OneTimeGrants, StratosError, UserId};

#[derive(Clone, Copy)]
struct Grant {
    used: bool,
    follow_ups_remaining: u32,
}

/// Mutex-guarded grant table matching the SQLite store's semantics.
#[derive(Default)]
pub struct MemoryGrants {
    grants: Mutex<HashMap<i64, Grant>>,
}

impl MemoryGrants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user's grant consumed, as the serving path would after the
    /// one report is generated.
    pub fn mark_used(&self, user: UserId) {
        if let Some(grant) = self.grants.lock().unwrap().get_mut(&user.0) {
            grant.used = true;
        }
    }
}

#[async_trait]
impl OneTimeGrants for MemoryGrants {
    async fn grant(&self, user: UserId) -> Result<(), StratosError> {
        self.grants.lock().unwrap().insert(
            user.0,
            Grant {
                used: false,
                follow_ups_remaining: 2,
            },
        );
        Ok(())
    }

    async fn remaining_follow_ups(&self, user: UserId) -> Result<u32, StratosError> {
        Ok(match self.grants.lock().unwrap().get(&user.0) {
            Some(g) if !g.used => g.follow_ups_remaining,
            _ => 0,
        })
    }

    async fn consume_follow_up(&self, user: UserId) -> Result<(), StratosError> {
        if let Some(grant) = self.grants.lock().unwrap().get_mut(&user.0) {
            grant.follow_ups_remaining = grant.follow_ups_remaining.saturating_sub(1);
        }
        Ok(())
    }
}
