// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared identifiers and enums used throughout the Stratos workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A user account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A metered service the quota engine gates.
///
/// One usage counter exists per (user, service) pair. The string form is
/// the wire/config form ("queries", "follow_ups", "document_uploads").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Initial report queries.
    Queries,
    /// Follow-up questions on an existing report.
    FollowUps,
    /// Document uploads attached to a query.
    DocumentUploads,
}

/// Which class of model a plan is entitled to.
///
/// The concrete model name behind each tier is a deployment concern of the
/// generation collaborator, not of the quota core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Baseline model.
    #[default]
    Standard,
    /// Flagship model for paid tiers.
    Premium,
}

/// An append-only record of one processed query or follow-up.
///
/// Never mutated or deleted by this core; `plan` captures the plan the user
/// was on at the time of the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    /// User that issued the query.
    pub user_id: i64,
    /// The (normalized) query text.
    pub query: String,
    /// The generated response text.
    pub response: String,
    /// Plan name at the time of the query.
    pub plan: String,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

impl QueryRecord {
    /// Create a new record stamped with the current UTC time.
    pub fn new(user_id: UserId, query: String, response: String, plan: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.0,
            query,
            response,
            plan,
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        }
    }
}
