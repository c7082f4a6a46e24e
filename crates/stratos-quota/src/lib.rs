// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota admission and usage reset.
//!
//! [`QuotaEngine`] decides, for a (user, plan, service) triple, whether a
//! request may proceed, consuming one unit of the metered limit when it
//! does. [`UsageResetJob`] is the periodic boundary that zeroes the
//! counters the engine meters against.

pub mod engine;
pub mod reset;

pub use engine::{Admission, DenialReason, GrantReason, QuotaEngine};
pub use reset::{ResetSummary, UsageResetJob};
