// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Stratos report-service core.
//!
//! This crate provides the foundational error type, identifiers, the typed
//! store-key builder, and the adapter traits implemented by the storage,
//! generation, and directory collaborators. Higher-level crates (quota,
//! cache, prewarm) depend only on the traits defined here.

pub mod error;
pub mod key;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StratosError;
pub use key::{Fingerprint, KeyClass, StoreKey};
pub use traits::{AdminDirectory, KeyValueStore, OneTimeGrants, QueryLog, ReportGenerator};
pub use types::{ModelTier, QueryRecord, ServiceKind, UserId};
