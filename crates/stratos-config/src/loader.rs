// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./stratos.toml` > `~/.config/stratos/stratos.toml`
//! > `/etc/stratos/stratos.toml` with environment variable overrides via the
//! `STRATOS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StratosConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/stratos/stratos.toml` (system-wide)
/// 3. `~/.config/stratos/stratos.toml` (user XDG config)
/// 4. `./stratos.toml` (local directory)
/// 5. `STRATOS_*` environment variables
pub fn load_config() -> Result<StratosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StratosConfig::default()))
        .merge(Toml::file("/etc/stratos/stratos.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("stratos/stratos.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("stratos.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and for loading an explicit config file.
pub fn load_config_from_str(toml_content: &str) -> Result<StratosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StratosConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StratosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StratosConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Section names that become the leading dotted component of an env key.
const ENV_SECTIONS: [&str; 5] = ["service", "storage", "cache", "prewarm", "generation"];

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `STRATOS_CACHE_REPORT_TTL_SECS` must
/// map to `cache.report_ttl_secs`, not `cache.report.ttl.secs`.
///
/// The key arrives with the prefix stripped but still in the variable's
/// original (upper) case, so it is lowercased before matching. Only the
/// leading section token is rewritten; the rest of the key is kept intact
/// even when it happens to contain a section name (`cache_prewarm_ttl_secs`
/// maps to `cache.prewarm_ttl_secs`).
fn env_provider() -> Env {
    Env::prefixed("STRATOS_").map(|key| {
        let lower = key.as_str().to_ascii_lowercase();
        for section in ENV_SECTIONS {
            if let Some(rest) = lower.strip_prefix(section) {
                if let Some(rest) = rest.strip_prefix('_') {
                    return format!("{section}.{rest}").into();
                }
            }
        }
        lower.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "stratos");
        assert_eq!(config.prewarm.top_n, 5);
        assert_eq!(config.plans.len(), 7);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[prewarm]
top_n = 3
schedule = "30 2 * * *"

[cache]
report_ttl_secs = 7200
"#,
        )
        .unwrap();
        assert_eq!(config.prewarm.top_n, 3);
        assert_eq!(config.prewarm.schedule, "30 2 * * *");
        assert_eq!(config.cache.report_ttl_secs, 7200);
        // untouched sections keep their defaults
        assert_eq!(config.cache.session_ttl_secs, 3600);
    }

    #[test]
    fn env_var_overrides_land_in_their_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRATOS_PREWARM_TOP_N", "9");
            jail.set_env("STRATOS_GENERATION_API_KEY", "sk-test");
            let config: StratosConfig = Figment::new()
                .merge(Serialized::defaults(StratosConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.prewarm.top_n, 9);
            assert_eq!(config.generation.api_key.as_deref(), Some("sk-test"));
            Ok(())
        });
    }

    #[test]
    fn env_mapping_rewrites_only_the_leading_section_token() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRATOS_CACHE_PREWARM_TTL_SECS", "3600");
            let config: StratosConfig = Figment::new()
                .merge(Serialized::defaults(StratosConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.cache.prewarm_ttl_secs, 3600);
            Ok(())
        });
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[prewarm]
topn = 3
"#,
        );
        assert!(result.is_err());
    }
}
