// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Store` trait: the full capability set the engine consumes from its
//! data store.
//!
//! The engine never reaches for an ambient client; every component receives
//! an `Arc<dyn Store>` so tests can swap in an in-memory fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AbTest, Cadence, Call, CallAttempt, Lead, NumberStatus, PhoneNumber, ReputationLog,
    RotationQueueItem, SpamEvent,
};

/// Capability set for the relational backing store.
///
/// All reads are scoped by owner where the contract requires row-level
/// ownership. List results have a defined order where the engine depends
/// on it (documented per method).
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // --- Phone numbers ---

    /// Fetch one number by owner and id.
    async fn get_number(&self, owner_id: &str, id: &str) -> Result<Option<PhoneNumber>>;

    async fn insert_number(&self, number: &PhoneNumber) -> Result<()>;

    /// Full-row update keyed by id. The row must exist.
    async fn update_number(&self, number: &PhoneNumber) -> Result<()>;

    /// List an owner's numbers whose status is in `statuses`, ordered by
    /// creation time ascending. An empty `statuses` slice matches nothing.
    async fn list_numbers(
        &self,
        owner_id: &str,
        statuses: &[NumberStatus],
    ) -> Result<Vec<PhoneNumber>>;

    /// Update only the `last_checked_at` field of a number.
    async fn touch_last_checked(&self, id: &str, ts: &str) -> Result<()>;

    // --- Cadences ---

    async fn get_cadence(&self, owner_id: &str, id: &str) -> Result<Option<Cadence>>;

    async fn insert_cadence(&self, cadence: &Cadence) -> Result<()>;

    // --- Calls (append-only) ---

    async fn insert_call(&self, call: &Call) -> Result<()>;

    /// The most recent call logged against a cadence (by created_at
    /// descending), used for round-robin position lookup.
    async fn most_recent_call_for_cadence(&self, cadence_id: &str) -> Result<Option<Call>>;

    /// All of an owner's calls with `created_at >= since`.
    async fn calls_for_owner_since(&self, owner_id: &str, since: &str) -> Result<Vec<Call>>;

    // --- Rotation queue ---

    async fn insert_queue_item(&self, item: &RotationQueueItem) -> Result<()>;

    /// Up to `limit` pending items, ordered by priority ascending then
    /// scheduled time ascending.
    async fn pending_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>>;

    /// Claim an item for processing: `pending -> in_progress`.
    ///
    /// The claim is conditional: it succeeds only if the item is still
    /// `pending`, so two concurrent processor runs can never both act on
    /// the same item. Returns `false` when the claim was lost.
    async fn claim_queue_item(&self, id: &str, started_at: &str) -> Result<bool>;

    /// Transition a claimed item to `completed`.
    async fn complete_queue_item(&self, id: &str, completed_at: &str) -> Result<()>;

    /// Transition a claimed item to `failed`, recording a diagnostic message.
    async fn fail_queue_item(&self, id: &str, error: &str, completed_at: &str) -> Result<()>;

    /// Cancel an owner's item. Succeeds only while the item is `pending` or
    /// `in_progress`; returns `false` otherwise (including not-owned).
    async fn cancel_queue_item(&self, owner_id: &str, id: &str) -> Result<bool>;

    /// All queue items belonging to an owner, most recently scheduled first.
    async fn queue_items_for_owner(&self, owner_id: &str) -> Result<Vec<RotationQueueItem>>;

    /// Up to `limit` failed items, oldest first. Used by the reconciliation
    /// sweep to repair half-completed rotations.
    async fn failed_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>>;

    /// Rewrite the diagnostic message of a `failed` item. The reconciliation
    /// sweep uses this to retire the orphan marker once a repair lands; the
    /// update is a no-op for items in any other status.
    async fn update_queue_item_error(&self, id: &str, error: &str) -> Result<()>;

    // --- Audit records (append-only) ---

    async fn insert_spam_event(&self, event: &SpamEvent) -> Result<()>;

    async fn insert_reputation_log(&self, log: &ReputationLog) -> Result<()>;

    // --- A/B test support ---

    async fn insert_ab_test(&self, test: &AbTest) -> Result<()>;

    async fn insert_lead(&self, lead: &Lead) -> Result<()>;

    async fn insert_attempt(&self, attempt: &CallAttempt) -> Result<()>;

    async fn leads_for_test(&self, test_id: &str) -> Result<Vec<Lead>>;

    async fn attempts_for_leads(&self, lead_ids: &[String]) -> Result<Vec<CallAttempt>>;
}
