// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Rotary rotation engine.
//!
//! Four components behind one facade:
//!
//! - [`reputation`]: pure scoring of call outcomes, plus the persisting
//!   updater that logs every score change.
//! - [`selector`]: next-number selection for a cadence (round-robin,
//!   random, reputation-based).
//! - [`queue`]: the spam-rotation queue processor, with exclusive claims
//!   and compensated swaps.
//! - [`stats`]: pure aggregation of call and A/B test metrics.
//!
//! [`RotationService`] wires them to an `Arc<dyn Store>` and exposes the
//! operation boundary an API layer consumes.

pub mod queue;
pub mod reputation;
pub mod selector;
pub mod service;
pub mod stats;
pub mod validate;

pub use queue::{DEFAULT_PRIORITY, ProcessReport, QueueProcessor, RotationRequest};
pub use reputation::{apply_call_outcome, compute_reputation};
pub use selector::{resolve_strategy, select_next};
pub use service::{CallEntry, RotationService, TestMetrics};
pub use stats::{Metrics, Timeframe, aggregate, call_summary};
pub use validate::{apply_validation, combined_verdict};
