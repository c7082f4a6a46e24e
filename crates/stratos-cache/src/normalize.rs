// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query text normalization.
//!
//! Strips conversational filler, collapses whitespace, and canonicalizes
//! casing so that trivially different phrasings of the same question share
//! one frequency counter and one pre-warmed cache entry.

use std::sync::LazyLock;

use regex::Regex;

/// Conversational filler stripped before counting or caching.
static FILLER_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(hey|hi|thanks|wondering)\b").unwrap());

static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw query into its canonical form.
///
/// Filler words go first, then whitespace runs collapse to single spaces,
/// then the result is trimmed and capitalized (first character uppercase,
/// remainder lowercase). An input that is all filler normalizes to the
/// empty string; callers treat that as untrackable.
pub fn normalize_query(raw: &str) -> String {
    let stripped = FILLER_WORDS.replace_all(raw.trim(), "");
    let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");
    capitalize(collapsed.trim())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
