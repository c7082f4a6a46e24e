// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fakes for testing Stratos components without SQLite or HTTP.
//!
//! - [`MemoryKv`]: a `KeyValueStore` over a mutex-guarded map, with a
//!   switchable "unavailable" mode for exercising infrastructure-failure
//!   paths
//! - [`StaticAdmins`]: an `AdminDirectory` over a fixed id set
//! - [`MemoryGrants`]: a `OneTimeGrants` table in a mutex-guarded map
//! - [`ScriptedGenerator`]: a `ReportGenerator` with canned output,
//!   per-substring failure injection, and a call counter

pub mod admins;
pub mod generator;
pub mod grants;
pub mod kv;

pub use admins::StaticAdmins;
pub use generator::ScriptedGenerator;
pub use grants::MemoryGrants;
pub use kv::MemoryKv;
