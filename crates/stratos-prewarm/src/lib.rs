// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch pre-warming of popular report queries.
//!
//! [`PrewarmJob`] runs one pass: pick the top-N most-asked queries, skip
//! ones with a live cache entry, generate the rest, and cache them at the
//! extended pre-warm TTL under the shared system fingerprint.
//! [`PrewarmScheduler`] drives the job on a cron schedule.

pub mod job;
pub mod scheduler;

pub use job::{PrewarmJob, PrewarmOptions, PrewarmSummary};
pub use scheduler::PrewarmScheduler;
