// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Rotary rotation engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use rotary_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("batch size: {}", config.rotation.batch_size);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ReputationConfig, RotaryConfig, RotationConfig, StorageConfig};
pub use validation::{ConfigError, validate_config};

/// Load configuration from the XDG hierarchy and validate it.
///
/// The high-level entry point: loads from TOML files + env vars via Figment,
/// then runs post-deserialization validation.
pub fn load_and_validate() -> Result<RotaryConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Validation {
            message: err.to_string(),
        }]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RotaryConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Validation {
            message: err.to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_accepts_good_config() {
        let config = load_and_validate_str("[rotation]\nbatch_size = 5\n").unwrap();
        assert_eq!(config.rotation.batch_size, 5);
    }

    #[test]
    fn load_and_validate_str_rejects_semantic_errors() {
        let errors = load_and_validate_str("[rotation]\nbatch_size = 0\n").unwrap_err();
        assert!(errors[0].to_string().contains("batch_size"));
    }
}
