// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Stratos core.
//!
//! A single [`Database`] handle (one tokio-rusqlite background thread) backs
//! four stores:
//!
//! - [`SqliteKv`]: the key-value/counter substrate with TTL expiry and
//!   atomic admission, implementing `stratos_core::KeyValueStore`
//! - [`GrantStore`]: one-time access grants
//! - [`UserDirectory`]: user accounts and the administrator flag
//! - [`QueryLogStore`]: the append-only processed-query log
//!
//! All writes serialize through the single background connection; counter
//! admission runs read-check-increment inside one `call`, which is what
//! makes concurrent admissions race-free.

pub mod database;
pub mod grants;
pub mod kv;
pub mod migrations;
pub mod query_log;
pub mod users;

pub use database::Database;
pub use grants::{GrantStore, OneTimeGrant};
pub use kv::SqliteKv;
pub use query_log::QueryLogStore;
pub use users::{NewUser, UserDirectory};
