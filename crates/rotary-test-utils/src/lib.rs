// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rotary integration tests.
//!
//! Provides an in-memory `Store` fake, mock SPAM validators, and fixture
//! builders for fast, deterministic, CI-runnable tests without SQLite or
//! external providers.
//!
//! # Components
//!
//! - [`MemoryStore`] - in-memory `Store` with write-failure injection
//! - [`MockValidator`] - mock SPAM provider with pre-configured verdicts

pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_validator;

pub use harness::init_tracing;
pub use memory_store::MemoryStore;
pub use mock_validator::{MockValidator, clean_verdict, spam_verdict};
