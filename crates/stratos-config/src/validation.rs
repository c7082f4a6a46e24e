// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, sane cron expressions, and a
//! coherent plan catalog.

use std::collections::HashSet;

use stratos_plans::PlanKind;

use crate::diagnostic::ConfigError;
use crate::model::StratosConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StratosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.prewarm.top_n == 0 {
        errors.push(ConfigError::Validation {
            message: "prewarm.top_n must be at least 1".to_string(),
        });
    }

    // Five whitespace-separated fields: minute hour day-of-month month day-of-week.
    let fields = config.prewarm.schedule.split_whitespace().count();
    if fields != 5 {
        errors.push(ConfigError::Validation {
            message: format!(
                "prewarm.schedule `{}` is not a 5-field cron expression",
                config.prewarm.schedule
            ),
        });
    }

    if config.prewarm.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "prewarm.max_tokens must be at least 1".to_string(),
        });
    }

    if !config.generation.base_url.starts_with("http://")
        && !config.generation.base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "generation.base_url `{}` must be an http(s) URL",
                config.generation.base_url
            ),
        });
    }

    if config.generation.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.timeout_secs must be at least 1".to_string(),
        });
    }

    // Catalog rules mirror what the plan registry enforces, surfaced here so
    // misconfigurations fail at startup with a readable diagnostic.
    if config.plans.is_empty() {
        errors.push(ConfigError::Validation {
            message: "plans must contain at least one entry".to_string(),
        });
    }

    let mut seen_names = HashSet::new();
    for plan in &config.plans {
        if plan.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "plan names must not be empty".to_string(),
            });
        }
        if !seen_names.insert(&plan.name) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate plan name `{}` in [[plans]] array", plan.name),
            });
        }
    }

    if let Some(first) = config.plans.first() {
        if first.kind != PlanKind::Subscription {
            errors.push(ConfigError::Validation {
                message: format!(
                    "the first plan (`{}`) is the default tier and must be a subscription plan",
                    first.name
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = StratosConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = StratosConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_top_n_fails_validation() {
        let mut config = StratosConfig::default();
        config.prewarm.top_n = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("top_n"))
        ));
    }

    #[test]
    fn malformed_cron_schedule_fails_validation() {
        let mut config = StratosConfig::default();
        config.prewarm.schedule = "3am daily".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("schedule"))
        ));
    }

    #[test]
    fn duplicate_plan_names_fail_validation() {
        let mut config = StratosConfig::default();
        let first = config.plans[0].clone();
        config.plans.push(first);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate plan name"))
        ));
    }

    #[test]
    fn one_time_first_plan_fails_validation() {
        let mut config = StratosConfig::default();
        config.plans.rotate_right(1); // moves the one-time plan to the front
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("default tier"))
        ));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = StratosConfig::default();
        config.generation.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))
        ));
    }
}
