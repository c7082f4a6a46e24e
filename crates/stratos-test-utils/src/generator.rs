// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted `ReportGenerator` fake with failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use stratos_core::{ModelTier, ReportGenerator, StratosError};

/// Generator producing deterministic canned output.
///
/// Prompts containing a registered failure marker return a generation
/// error instead; the call counter covers both outcomes.
#[derive(Default)]
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    fail_markers: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any prompt containing `marker`.
    pub fn fail_on(&self, marker: &str) {
        self.fail_markers.lock().unwrap().push(marker.to_string());
    }

    /// Total generate() invocations, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        _max_tokens: u32,
    ) -> Result<String, StratosError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let markers = self.fail_markers.lock().unwrap();
        if let Some(marker) = markers.iter().find(|m| prompt.contains(m.as_str())) {
            return Err(StratosError::Generation {
                message: format!("scripted failure on `{marker}`"),
                source: None,
            });
        }
        Ok(format!("[{tier}] report: {prompt}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_deterministic_output_and_counts_calls() {
        let generator = ScriptedGenerator::new();
        let out = generator
            .generate("scale a bakery", ModelTier::Premium, 1024)
            .await
            .unwrap();
        assert_eq!(out, "[premium] report: scale a bakery");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn fail_marker_triggers_generation_error() {
        let generator = ScriptedGenerator::new();
        generator.fail_on("bad");
        let err = generator
            .generate("a bad prompt", ModelTier::Standard, 256)
            .await;
        assert!(matches!(err, Err(StratosError::Generation { .. })));
        assert_eq!(generator.calls(), 1);
    }
}
