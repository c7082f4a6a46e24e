// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report generation over a chat-completions HTTP endpoint.
//!
//! [`ReportClient`] implements [`stratos_core::ReportGenerator`], mapping
//! [`stratos_core::ModelTier`] to the configured model identifiers and
//! retrying once on transient endpoint errors.

pub mod client;
pub mod types;

pub use client::{GenerationOptions, ReportClient};
