// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rotary.toml` > `~/.config/rotary/rotary.toml`
//! > `/etc/rotary/rotary.toml` with environment variable overrides via the
//! `ROTARY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RotaryConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rotary/rotary.toml` (system-wide)
/// 3. `~/.config/rotary/rotary.toml` (user XDG config)
/// 4. `./rotary.toml` (local directory)
/// 5. `ROTARY_*` environment variables
pub fn load_config() -> Result<RotaryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RotaryConfig::default()))
        .merge(Toml::file("/etc/rotary/rotary.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rotary/rotary.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rotary.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RotaryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RotaryConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RotaryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RotaryConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ROTARY_ROTATION_BATCH_SIZE` must map to
/// `rotation.batch_size`, not `rotation.batch.size`.
fn env_provider() -> Env {
    Env::prefixed("ROTARY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: ROTARY_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("reputation_", "reputation.", 1)
            .replacen("rotation_", "rotation.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [rotation]
            batch_size = 3
            legacy_strategy_fallback = true

            [reputation]
            spam_penalty = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation.batch_size, 3);
        assert!(config.rotation.legacy_strategy_fallback);
        assert_eq!(config.reputation.spam_penalty, 40.0);
        // Untouched sections keep defaults.
        assert_eq!(config.storage.database_path, "rotary.db");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [rotation]
            batch_sise = 3
            "#,
        );
        assert!(result.is_err(), "typo'd key should be rejected");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.reputation.success_step, 2.0);
    }
}
