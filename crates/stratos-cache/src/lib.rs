// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response caching and query popularity tracking.
//!
//! Three concerns live here, all over the shared [`stratos_core::KeyValueStore`]:
//!
//! - [`ResponseCache`]: TTL-scoped report, follow-up, session, and
//!   AI-memory entries
//! - [`FrequencyTracker`]: no-TTL popularity counters feeding pre-warm
//! - [`normalize_query`]: the canonical form shared by both

pub mod frequency;
pub mod normalize;
pub mod response;

pub use frequency::{FrequencyTracker, PopularQuery};
pub use normalize::normalize_query;
pub use response::{CacheTtls, MemoryRecord, ResponseCache};
