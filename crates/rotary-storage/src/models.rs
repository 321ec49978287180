// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `rotary-core::types` for use across
//! the `Store` trait boundary. This module re-exports them for convenience
//! within the storage crate.

pub use rotary_core::types::{
    AbTest, Cadence, Call, CallAttempt, CallOutcome, Lead, NumberStatus, PhoneNumber,
    QueueStatus, ReputationLog, ReputationSource, RotationKind, RotationQueueItem,
    SpamDetector, SpamEvent, TestGroup,
};
