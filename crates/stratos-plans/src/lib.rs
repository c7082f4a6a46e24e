// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan registry for the Stratos report service.
//!
//! A plan is a named bundle of entitlements (query, document, expert, and
//! follow-up quotas plus model tier). The registry is built once at process
//! start from configuration and is read-only afterwards. A user record may
//! reference a plan name that has since been renamed or retired, so
//! [`PlanRegistry::normalize`] maps any unrecognized name to the default
//! free tier and logs the anomaly rather than failing.

pub mod catalog;
pub mod registry;

pub use catalog::{builtin_catalog, ONE_TIME_FOLLOW_UPS, ONE_TIME_REPORT};
pub use registry::{Plan, PlanKind, PlanRegistry, QuotaLimit};
