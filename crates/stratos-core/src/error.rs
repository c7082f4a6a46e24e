// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stratos core.
//!
//! Quota denial is deliberately *not* an error: `CheckAndConsume` returns an
//! `Admission` value so callers can tell "limit reached" apart from "the
//! store is down". Only infrastructure and data anomalies surface here.

use thiserror::Error;

/// The primary error type used across all Stratos crates.
#[derive(Debug, Error)]
pub enum StratosError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value / relational store errors (connection, query failure).
    ///
    /// Distinct from a quota denial: callers should present "try again
    /// later", fail closed on admission checks, and log loudly.
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Report generation collaborator errors (API failure, bad response).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A plan identifier that the registry does not recognize.
    ///
    /// Registry consumers normalize to the default tier instead of
    /// propagating this to end users; the quota engine fails closed on it.
    #[error("unknown plan: {plan}")]
    UnknownPlan { plan: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StratosError {
    /// Wrap any error as a store (infrastructure) failure.
    pub fn store<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            source: Box::new(source),
        }
    }
}
