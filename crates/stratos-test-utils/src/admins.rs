// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-set `AdminDirectory` fake.

use std::collections::HashSet;

use async_trait::async_trait;

use stratos_core::{AdminDirectory, StratosError, UserId};

/// Admin directory backed by a fixed id set.
#[derive(Default)]
pub struct StaticAdmins {
    admins: HashSet<i64>,
}

impl StaticAdmins {
    /// Directory with no admins.
    pub fn none() -> Self {
        Self::default()
    }

    /// Directory flagging exactly the given ids.
    pub fn with(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AdminDirectory for StaticAdmins {
    async fn is_admin(&self, user: UserId) -> Result<bool, StratosError> {
        Ok(self.admins.contains(&user.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flags_only_listed_ids() {
        let admins = StaticAdmins::with([1, 7]);
        assert!(admins.is_admin(UserId(1)).await.unwrap());
        assert!(admins.is_admin(UserId(7)).await.unwrap());
        assert!(!admins.is_admin(UserId(2)).await.unwrap());
        assert!(!StaticAdmins::none().is_admin(UserId(1)).await.unwrap());
    }
}
