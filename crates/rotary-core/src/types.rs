// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Rotary workspace.
//!
//! Status enums are stored as snake_case TEXT columns and round-trip through
//! strum's `Display`/`EnumString`. Timestamps are UTC ISO-8601 strings with
//! millisecond precision, which sort lexicographically.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reputation score bounds. Scores are clamped, never wrapped.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a reputation score into the valid `[0, 100]` range.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Current UTC timestamp as an ISO-8601 string with millisecond precision.
pub fn now_ts() -> String {
    format_ts(chrono::Utc::now())
}

/// Format a UTC instant the way all stored timestamps are written, so that
/// string comparison orders them chronologically.
pub fn format_ts(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Generate a new UUID v4 identifier string.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Lifecycle status of a phone number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NumberStatus {
    Active,
    Inactive,
    Spam,
    Deprecated,
    Blocked,
}

/// A phone number under reputation management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// The number string in E.164 or provider-native form.
    pub number: String,
    /// Voice provider tag (opaque to the engine).
    pub provider: Option<String>,
    pub status: NumberStatus,
    /// Reputation score in `[0, 100]`.
    pub reputation: f64,
    /// Count of spam reports accumulated from validation providers.
    pub spam_reports: u32,
    /// Owning user.
    pub owner_id: String,
    /// Last time the number was selected or validated.
    pub last_checked_at: Option<String>,
    pub created_at: String,
}

impl PhoneNumber {
    /// Enforce row invariants when hydrating from a store.
    ///
    /// The score is clamped into `[0, 100]` so a corrupt row can never leak
    /// an out-of-range value into the engine.
    pub fn validated(mut self) -> Self {
        self.reputation = clamp_score(self.reputation);
        self
    }
}

/// Strategy used by a cadence to pick the next outbound number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    RoundRobin,
    Random,
    ReputationBased,
}

/// A named, owned collection of phone numbers plus a rotation strategy.
///
/// The strategy is kept as the raw stored string; it is resolved (and an
/// unrecognized value surfaced as `InvalidStrategy`) at selection time, not
/// at hydration, so a bad strategy on one cadence cannot poison list reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cadence {
    pub id: String,
    pub name: String,
    /// Member number ids in pool order.
    pub number_ids: Vec<String>,
    pub strategy: String,
    pub active: bool,
    pub owner_id: String,
    pub created_at: String,
}

/// Outcome of a single call attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    Failed,
    Busy,
    NoAnswer,
    SpamDetected,
}

/// An immutable call record. Append-only: never updated or deleted once
/// logged, so reputation computation has a stable audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub number_id: String,
    pub cadence_id: Option<String>,
    pub destination: String,
    pub outcome: CallOutcome,
    pub duration_secs: f64,
    pub cost: f64,
    pub owner_id: String,
    pub created_at: String,
}

/// Why a rotation queue item was created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RotationKind {
    SpamRotation,
    ScheduledRotation,
    ManualRotation,
}

/// Processing state of a rotation queue item.
///
/// `pending -> in_progress -> {completed, failed}`; `cancelled` is reachable
/// from the two non-terminal states only. Terminal states are final.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl QueueStatus {
    /// Whether this state is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueueStatus::Completed | QueueStatus::Failed | QueueStatus::Cancelled
        )
    }
}

/// What detected the condition that triggered a spam event or rotation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpamDetector {
    Api,
    User,
    Automatic,
}

/// A queued replace-this-number operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationQueueItem {
    pub id: String,
    /// The number to rotate out.
    pub number_id: String,
    pub owner_id: String,
    pub kind: RotationKind,
    /// Lower is more urgent.
    pub priority: i64,
    pub status: QueueStatus,
    pub reason: String,
    pub detector: SpamDetector,
    /// Free-form JSON context payload.
    pub context: Option<String>,
    /// Diagnostic message recorded when the item fails.
    pub error: Option<String>,
    pub scheduled_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

/// An append-only spam/rotation audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamEvent {
    pub id: String,
    pub number_id: String,
    pub owner_id: String,
    /// Event type string, e.g. `rotation_completed`.
    pub event_type: String,
    pub reason: String,
    pub detector: SpamDetector,
    /// Free-form JSON context.
    pub context: Option<String>,
    pub created_at: String,
}

/// What triggered a reputation score change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReputationSource {
    ApiCheck,
    CallOutcome,
}

/// Append-only record of one reputation score change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationLog {
    pub id: String,
    pub number_id: String,
    pub old_score: f64,
    pub new_score: f64,
    pub reason: String,
    pub source: ReputationSource,
    pub created_at: String,
}

/// A/B test group assignment for a lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum TestGroup {
    A,
    B,
}

/// An A/B test comparing two calling configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbTest {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: String,
}

/// A lead assigned to one group of an A/B test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub test_id: String,
    pub group: TestGroup,
    pub converted: bool,
    pub owner_id: String,
    pub created_at: String,
}

/// One dial attempt against a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAttempt {
    pub id: String,
    pub lead_id: String,
    pub answered: bool,
    pub duration_secs: f64,
    /// Whether the originating number was spam-checked for this attempt.
    pub spam_checked: bool,
    pub spam_score: Option<f64>,
    /// Whether the attempt was blocked by carrier spam filtering.
    pub blocked: bool,
    pub created_at: String,
}

/// Normalized verdict returned by a SPAM-validation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamVerdict {
    pub is_spam: bool,
    /// Provider-reported reputation in `[0, 100]`.
    pub reputation: f64,
    pub reports: u32,
    pub reason: String,
    pub enrichment: Option<NumberEnrichment>,
}

/// Optional carrier/line metadata attached to a provider verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberEnrichment {
    pub carrier: Option<String>,
    pub line_type: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub location: Option<String>,
}

/// The result of a next-number selection.
#[derive(Debug, Clone)]
pub struct RotationResult {
    pub number: PhoneNumber,
    pub strategy: RotationStrategy,
    /// Size of the eligible pool the selection was made from.
    pub pool_size: usize,
}
