// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory: accounts, plan assignment, and the administrator flag.
//!
//! Password hashing and authentication live in the auth collaborator; this
//! store only persists the already-hashed credential. The stored plan name
//! may be stale -- consumers normalize it through the plan registry.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use stratos_core::{AdminDirectory, StratosError, UserId};

use crate::database::{map_tr_err, Database};

/// Input for account creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub plan: String,
}

/// SQLite-backed user directory.
#[derive(Clone)]
pub struct UserDirectory {
    db: Database,
}

impl UserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create an account; returns the new user id.
    ///
    /// A duplicate email is a store error (unique constraint).
    pub async fn create(&self, user: NewUser) -> Result<UserId, StratosError> {
        let id = self
            .db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO users (email, password_hash, plan) VALUES (?1, ?2, ?3)",
                    params![user.email, user.password_hash, user.plan],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(map_tr_err)?;
        info!(user_id = id, "user created");
        Ok(UserId(id))
    }

    /// The stored (possibly stale) plan name, if the user exists.
    pub async fn plan_of(&self, user: UserId) -> Result<Option<String>, StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT plan FROM users WHERE id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Update a user's plan by id.
    pub async fn set_plan(&self, user: UserId, plan: &str) -> Result<(), StratosError> {
        let user_id = user.0;
        let plan = plan.to_string();
        let changed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "UPDATE users SET plan = ?1 WHERE id = ?2",
                    params![plan, user_id],
                )
            })
            .await
            .map_err(map_tr_err)?;
        if changed == 0 {
            return Err(StratosError::Internal(format!(
                "cannot update plan: user {user} does not exist"
            )));
        }
        Ok(())
    }

    /// Flag or unflag a user as administrator.
    pub async fn set_admin(&self, user: UserId, is_admin: bool) -> Result<(), StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE users SET is_admin = ?1 WHERE id = ?2",
                    params![is_admin as i64, user_id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl AdminDirectory for UserDirectory {
    async fn is_admin(&self, user: UserId) -> Result<bool, StratosError> {
        let user_id = user.0;
        self.db
            .connection()
            .call(move |conn| -> Result<Option<i64>, rusqlite::Error> {
                conn.query_row(
                    "SELECT is_admin FROM users WHERE id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
            // An unknown user is simply not an admin.
            .map(|flag| flag.unwrap_or(0) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn directory() -> UserDirectory {
        UserDirectory::new(Database::open_in_memory().await.unwrap())
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            plan: "The Foundation (Free)".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_read_plan() {
        let users = directory().await;
        let id = users.create(new_user("a@example.com")).await.unwrap();
        assert_eq!(
            users.plan_of(id).await.unwrap().as_deref(),
            Some("The Foundation (Free)")
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let users = directory().await;
        users.create(new_user("a@example.com")).await.unwrap();
        let err = users.create(new_user("a@example.com")).await;
        assert!(matches!(err, Err(StratosError::Store { .. })));
    }

    #[tokio::test]
    async fn set_plan_updates_stored_name() {
        let users = directory().await;
        let id = users.create(new_user("b@example.com")).await.unwrap();
        users.set_plan(id, "The Tactician").await.unwrap();
        assert_eq!(
            users.plan_of(id).await.unwrap().as_deref(),
            Some("The Tactician")
        );
    }

    #[tokio::test]
    async fn set_plan_for_missing_user_errors() {
        let users = directory().await;
        let err = users.set_plan(UserId(404), "The Tactician").await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn admin_flag_round_trip() {
        let users = directory().await;
        let id = users.create(new_user("c@example.com")).await.unwrap();
        assert!(!users.is_admin(id).await.unwrap());
        users.set_admin(id, true).await.unwrap();
        assert!(users.is_admin(id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_is_not_admin() {
        let users = directory().await;
        assert!(!users.is_admin(UserId(12345)).await.unwrap());
    }
}
