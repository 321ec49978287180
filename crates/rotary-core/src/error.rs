// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rotary rotation engine.

use thiserror::Error;

/// The primary error type used across all Rotary crates and core operations.
///
/// Every public operation returns `Result<_, RotaryError>`; failures never
/// cross the contract boundary as panics.
#[derive(Debug, Error)]
pub enum RotaryError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Referenced entity does not exist or is not owned by the caller.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Rotation or replacement selection found zero eligible candidates.
    ///
    /// Distinct from [`RotaryError::NotFound`]: the owner and cadence exist,
    /// but the candidate pool is empty.
    #[error("no available numbers for owner {owner_id}")]
    NoAvailableNumbers { owner_id: String },

    /// A rotation strategy string that is not one of the recognized variants.
    #[error("invalid rotation strategy: {0}")]
    InvalidStrategy(String),

    /// External SPAM-validation provider errors (API failure, timeout).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RotaryError {
    /// Wrap an arbitrary error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RotaryError::Storage {
            source: Box::new(source),
        }
    }
}

/// Result type for Rotary operations.
pub type Result<T> = std::result::Result<T, RotaryError>;
