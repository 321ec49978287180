// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and non-negative score steps.

use thiserror::Error;

use crate::model::RotaryConfig;

/// A single configuration validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RotaryConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.rotation.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "rotation.batch_size must be at least 1".to_string(),
        });
    }

    for (name, value) in [
        ("reputation.success_step", config.reputation.success_step),
        ("reputation.neutral_decay", config.reputation.neutral_decay),
        ("reputation.spam_penalty", config.reputation.spam_penalty),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be a non-negative finite number, got {value}"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RotaryConfig;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RotaryConfig::default()).is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = RotaryConfig::default();
        config.rotation.batch_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("batch_size"));
    }

    #[test]
    fn all_errors_are_collected_not_fail_fast() {
        let mut config = RotaryConfig::default();
        config.storage.database_path = "  ".into();
        config.rotation.batch_size = 0;
        config.reputation.spam_penalty = -3.0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn nan_step_is_rejected() {
        let mut config = RotaryConfig::default();
        config.reputation.success_step = f64::NAN;
        assert!(validate_config(&config).is_err());
    }
}
