// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rotary phone-number rotation engine.
//!
//! This crate provides the domain types, error taxonomy, and trait seams
//! used throughout the Rotary workspace. It performs no I/O: the `Store`
//! and `SpamValidator` traits are implemented by the storage crate and by
//! external provider clients respectively.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{Result, RotaryError};
pub use traits::{SpamValidator, Store};
pub use types::{
    CallOutcome, NumberStatus, QueueStatus, RotationKind, RotationStrategy, SpamDetector,
};
