// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed key construction for the shared key-value store.
//!
//! Every entry class lives in its own namespace prefix. Callers never
//! concatenate prefixes by hand: they go through the [`StoreKey`]
//! constructors, so cross-namespace collisions are unrepresentable and the
//! reset job can enumerate exactly the counter namespaces it owns.

use crate::types::{ServiceKind, UserId};

/// The distinct classes of store entries, each with its own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// Per-user UI session payload (short-lived JSON).
    Session,
    /// Per-user conversation-continuity record (JSON, 24h).
    AiMemory,
    /// Fingerprint-keyed cached report text.
    QueryCache,
    /// Fingerprint-keyed cached follow-up text.
    FollowUpCache,
    /// Global per-query-text popularity counter (no TTL).
    QueryFrequency,
    /// Per-user query usage counter.
    QueryCount,
    /// Per-user follow-up usage counter.
    FollowUpCount,
    /// Per-user document-upload usage counter.
    DocumentCount,
}

impl KeyClass {
    /// Namespace prefix, without the trailing separator.
    pub fn prefix(self) -> &'static str {
        match self {
            KeyClass::Session => "user_session",
            KeyClass::AiMemory => "ai_memory",
            KeyClass::QueryCache => "query_cache",
            KeyClass::FollowUpCache => "follow_up",
            KeyClass::QueryFrequency => "query_count",
            KeyClass::QueryCount => "user_query_count",
            KeyClass::FollowUpCount => "user_follow_up_count",
            KeyClass::DocumentCount => "user_docs_uploaded",
        }
    }

    /// The three namespaces the usage reset job owns.
    pub fn usage_counters() -> [KeyClass; 3] {
        [
            KeyClass::QueryCount,
            KeyClass::FollowUpCount,
            KeyClass::DocumentCount,
        ]
    }
}

impl ServiceKind {
    /// The counter namespace backing this service's usage ledger.
    pub fn key_class(self) -> KeyClass {
        match self {
            ServiceKind::Queries => KeyClass::QueryCount,
            ServiceKind::FollowUps => KeyClass::FollowUpCount,
            ServiceKind::DocumentUploads => KeyClass::DocumentCount,
        }
    }
}

/// An opaque, fully-qualified store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    class: KeyClass,
    full: String,
}

impl StoreKey {
    fn build(class: KeyClass, suffix: &str) -> Self {
        Self {
            class,
            full: format!("{}:{suffix}", class.prefix()),
        }
    }

    /// Session payload for a user.
    pub fn session(user: UserId) -> Self {
        Self::build(KeyClass::Session, &user.to_string())
    }

    /// AI-memory record for a user.
    pub fn ai_memory(user: UserId) -> Self {
        Self::build(KeyClass::AiMemory, &user.to_string())
    }

    /// Cached report text for a request fingerprint.
    pub fn report(fingerprint: &Fingerprint) -> Self {
        Self::build(KeyClass::QueryCache, fingerprint.as_str())
    }

    /// Cached follow-up text for a request fingerprint.
    pub fn follow_up(fingerprint: &Fingerprint) -> Self {
        Self::build(KeyClass::FollowUpCache, fingerprint.as_str())
    }

    /// Global popularity counter for a normalized query text.
    pub fn frequency(normalized_query: &str) -> Self {
        Self::build(KeyClass::QueryFrequency, normalized_query)
    }

    /// Usage counter for a (user, service) pair.
    pub fn usage(user: UserId, service: ServiceKind) -> Self {
        Self::build(service.key_class(), &user.to_string())
    }

    /// Rebuild a key from a stored full string, validating its prefix.
    ///
    /// Used when enumerating a namespace out of the store. Returns `None`
    /// if the string does not carry the expected prefix.
    pub fn from_stored(class: KeyClass, full: String) -> Option<Self> {
        let expected = format!("{}:", class.prefix());
        full.starts_with(&expected).then_some(Self { class, full })
    }

    /// Which namespace this key belongs to.
    pub fn class(&self) -> KeyClass {
        self.class
    }

    /// The fully-qualified key string.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The portion after the namespace prefix.
    ///
    /// For a frequency key this recovers the query text.
    pub fn suffix(&self) -> &str {
        &self.full[self.class.prefix().len() + 1..]
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Deterministic composite identity of a cacheable report request.
///
/// The same query under a different user or archetype must be a cache miss,
/// so all three parts are folded into the fingerprint. Pre-warmed entries
/// use the shared system identity instead of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of a user-scoped report request.
    pub fn for_user(user: UserId, archetype: &str, query: &str) -> Self {
        Self(format!("{user}:{archetype}:{query}"))
    }

    /// Fingerprint of a system-attributed (pre-warmed) request.
    ///
    /// No user and no archetype part, so every pre-warm of the same query
    /// lands on the same entry.
    pub fn shared(query: &str) -> Self {
        Self(format!("system::{query}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
