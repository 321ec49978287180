// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rotary rotation engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rotary configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RotaryConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reputation scoring policy.
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Rotation selector and queue processor settings.
    #[serde(default)]
    pub rotation: RotationConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "rotary.db".to_string()
}

/// Reputation scoring policy.
///
/// Step sizes are magnitudes; the sign is fixed by the outcome (success
/// raises, everything else lowers). Scores saturate at the [0, 100] bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReputationConfig {
    /// Score increase for a successful/answered call.
    #[serde(default = "default_success_step")]
    pub success_step: f64,

    /// Score decrease for failed/busy/no_answer outcomes.
    #[serde(default = "default_neutral_decay")]
    pub neutral_decay: f64,

    /// Score decrease when spam is detected on a call.
    #[serde(default = "default_spam_penalty")]
    pub spam_penalty: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            success_step: default_success_step(),
            neutral_decay: default_neutral_decay(),
            spam_penalty: default_spam_penalty(),
        }
    }
}

fn default_success_step() -> f64 {
    2.0
}

fn default_neutral_decay() -> f64 {
    1.0
}

fn default_spam_penalty() -> f64 {
    25.0
}

/// Rotation selector and queue processor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    /// Maximum number of queue items claimed per processing pass.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Restore the legacy behavior of silently coercing an unrecognized
    /// cadence strategy to `round_robin` (with a warning) instead of
    /// surfacing `InvalidStrategy`.
    #[serde(default)]
    pub legacy_strategy_fallback: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            legacy_strategy_fallback: false,
        }
    }
}

fn default_batch_size() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = RotaryConfig::default();
        assert_eq!(config.storage.database_path, "rotary.db");
        assert_eq!(config.reputation.success_step, 2.0);
        assert_eq!(config.reputation.neutral_decay, 1.0);
        assert_eq!(config.reputation.spam_penalty, 25.0);
        assert_eq!(config.rotation.batch_size, 10);
        assert!(!config.rotation.legacy_strategy_fallback);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = RotaryConfig::default();
        let serialized = toml::to_string(&config).expect("should serialize");
        let parsed: RotaryConfig = toml::from_str(&serialized).expect("should deserialize");
        assert_eq!(parsed.rotation.batch_size, config.rotation.batch_size);
    }
}
