// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spam-rotation queue processing.
//!
//! Each item moves `pending -> in_progress -> {completed, failed}`, with
//! `cancelled` reachable only by explicit user request. Claiming is a
//! conditional store update, so overlapping processor runs never act on the
//! same item twice. The three-step swap (deactivate original, activate
//! replacement, record event) compensates already-applied steps on failure.
//! When the compensation write itself fails, the item's diagnostic message
//! is tagged with an orphan marker; the reconciliation sweep acts only on
//! marked items and retires the marker once the repair lands.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::Store;
use rotary_core::types::{
    NumberStatus, PhoneNumber, RotationKind, RotationQueueItem, QueueStatus, SpamDetector,
    SpamEvent, new_id, now_ts,
};

/// Default priority for newly queued rotations (lower = more urgent).
pub const DEFAULT_PRIORITY: i64 = 100;

/// Prefix tagging a failed item whose original number was left deactivated
/// because the compensation write failed. Stripped again when reconciliation
/// repairs the number.
const ORPHAN_MARKER: &str = "[orphan] ";

/// Outcome of a failed swap: the error plus whether the original number was
/// left needing repair.
struct RotateFailure {
    error: RotaryError,
    orphaned: bool,
}

impl From<RotaryError> for RotateFailure {
    fn from(error: RotaryError) -> Self {
        Self {
            error,
            orphaned: false,
        }
    }
}

/// Request to enqueue a rotation.
#[derive(Debug, Clone)]
pub struct RotationRequest {
    pub number_id: String,
    pub owner_id: String,
    pub kind: RotationKind,
    pub priority: i64,
    pub reason: String,
    pub detector: SpamDetector,
    pub context: Option<String>,
}

/// Summary of one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Items claimed by this run.
    pub claimed: usize,
    /// Items that reached `completed`.
    pub completed: usize,
    /// Items that reached `failed`.
    pub failed: usize,
    /// Items another run claimed first.
    pub skipped: usize,
}

/// Processes pending rotation items against a store.
///
/// Invoked on demand (a periodic trigger is the caller's concern); safe to
/// invoke repeatedly and concurrently thanks to the exclusive claim step.
pub struct QueueProcessor {
    store: Arc<dyn Store>,
    batch_size: usize,
}

impl QueueProcessor {
    pub fn new(store: Arc<dyn Store>, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    /// Enqueue a rotation request. Returns the new item's id.
    pub async fn add_to_queue(&self, request: RotationRequest) -> Result<String> {
        // The target must exist and belong to the requester.
        self.store
            .get_number(&request.owner_id, &request.number_id)
            .await?
            .ok_or_else(|| RotaryError::NotFound {
                entity: "phone_number",
                id: request.number_id.clone(),
            })?;

        let item = RotationQueueItem {
            id: new_id(),
            number_id: request.number_id,
            owner_id: request.owner_id,
            kind: request.kind,
            priority: request.priority,
            status: QueueStatus::Pending,
            reason: request.reason,
            detector: request.detector,
            context: request.context,
            error: None,
            scheduled_at: now_ts(),
            started_at: None,
            completed_at: None,
        };
        self.store.insert_queue_item(&item).await?;
        info!(rotation_id = %item.id, number_id = %item.number_id, kind = %item.kind, "rotation queued");
        Ok(item.id)
    }

    /// Cancel a queued rotation. Owner-guarded; only `pending` and
    /// `in_progress` items can be cancelled.
    pub async fn cancel(&self, rotation_id: &str, owner_id: &str) -> Result<bool> {
        let cancelled = self.store.cancel_queue_item(owner_id, rotation_id).await?;
        if cancelled {
            info!(rotation_id, "rotation cancelled");
        }
        Ok(cancelled)
    }

    /// All queue items for an owner, most recently scheduled first.
    pub async fn queue_status(&self, owner_id: &str) -> Result<Vec<RotationQueueItem>> {
        self.store.queue_items_for_owner(owner_id).await
    }

    /// Process up to one batch of pending items.
    ///
    /// Per-item failures move the item to `failed` with a diagnostic
    /// message; they never abort the pass or bubble out of it.
    pub async fn process_queue(&self) -> Result<ProcessReport> {
        let mut report = ProcessReport::default();
        let pending = self.store.pending_queue_items(self.batch_size).await?;

        for item in pending {
            if !self.store.claim_queue_item(&item.id, &now_ts()).await? {
                // Another run got here first.
                report.skipped += 1;
                continue;
            }
            report.claimed += 1;

            match self.rotate(&item).await {
                Ok(replacement) => {
                    self.store.complete_queue_item(&item.id, &now_ts()).await?;
                    report.completed += 1;
                    info!(
                        rotation_id = %item.id,
                        original = %item.number_id,
                        replacement = %replacement.id,
                        "rotation completed"
                    );
                }
                Err(failure) => {
                    let message = if failure.orphaned {
                        format!("{ORPHAN_MARKER}{}", failure.error)
                    } else {
                        failure.error.to_string()
                    };
                    self.store
                        .fail_queue_item(&item.id, &message, &now_ts())
                        .await?;
                    report.failed += 1;
                    warn!(
                        rotation_id = %item.id,
                        error = %failure.error,
                        orphaned = failure.orphaned,
                        "rotation failed"
                    );
                }
            }
        }

        info!(
            claimed = report.claimed,
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "queue pass finished"
        );
        Ok(report)
    }

    /// Execute the swap for one claimed item. Returns the replacement.
    async fn rotate(
        &self,
        item: &RotationQueueItem,
    ) -> std::result::Result<PhoneNumber, RotateFailure> {
        let mut original = self
            .store
            .get_number(&item.owner_id, &item.number_id)
            .await?
            .ok_or_else(|| RotaryError::NotFound {
                entity: "phone_number",
                id: item.number_id.clone(),
            })?;

        let mut replacement = self.pick_replacement(&item.owner_id, &original.id).await?;

        let original_status = original.status;
        let replacement_status = replacement.status;

        // Step 1: deactivate the original.
        original.status = NumberStatus::Inactive;
        self.store.update_number(&original).await?;

        // Step 2: activate the replacement; on failure, restore the original.
        replacement.status = NumberStatus::Active;
        if let Err(e) = self.store.update_number(&replacement).await {
            let restored = self.restore(&mut original, original_status).await;
            return Err(RotateFailure {
                error: e,
                orphaned: !restored && original_status != NumberStatus::Inactive,
            });
        }

        // Step 3: record the audit event; on failure, undo both flips.
        let event = SpamEvent {
            id: new_id(),
            number_id: original.id.clone(),
            owner_id: item.owner_id.clone(),
            event_type: "rotation_completed".into(),
            reason: item.reason.clone(),
            detector: item.detector,
            context: Some(
                json!({
                    "rotation_id": item.id,
                    "replacement_id": replacement.id,
                    "kind": item.kind.to_string(),
                })
                .to_string(),
            ),
            created_at: now_ts(),
        };
        if let Err(e) = self.store.insert_spam_event(&event).await {
            self.restore(&mut replacement, replacement_status).await;
            let restored = self.restore(&mut original, original_status).await;
            return Err(RotateFailure {
                error: e,
                orphaned: !restored && original_status != NumberStatus::Inactive,
            });
        }

        Ok(replacement)
    }

    /// Best-effort compensation write. Returns whether the write landed; a
    /// lost restore of the original marks the item for
    /// [`reconcile`](Self::reconcile).
    async fn restore(&self, number: &mut PhoneNumber, status: NumberStatus) -> bool {
        number.status = status;
        match self.store.update_number(number).await {
            Ok(()) => true,
            Err(e) => {
                warn!(number_id = %number.id, error = %e, "rollback write failed; reconcile will repair");
                false
            }
        }
    }

    /// Pick a replacement among the owner's other numbers.
    ///
    /// Preference order over candidates sorted by creation time ascending:
    /// earliest `active`, else earliest `inactive`, else earliest of any
    /// remaining status as a last resort.
    async fn pick_replacement(&self, owner_id: &str, original_id: &str) -> Result<PhoneNumber> {
        let all_statuses = [
            NumberStatus::Active,
            NumberStatus::Inactive,
            NumberStatus::Spam,
            NumberStatus::Deprecated,
            NumberStatus::Blocked,
        ];
        let candidates: Vec<PhoneNumber> = self
            .store
            .list_numbers(owner_id, &all_statuses)
            .await?
            .into_iter()
            .filter(|n| n.id != original_id)
            .collect();

        let preferred = candidates
            .iter()
            .find(|n| n.status == NumberStatus::Active)
            .or_else(|| candidates.iter().find(|n| n.status == NumberStatus::Inactive))
            .or_else(|| candidates.first());

        preferred.cloned().ok_or_else(|| RotaryError::NoAvailableNumbers {
            owner_id: owner_id.to_string(),
        })
    }

    /// Repair orphaned half-completed rotations.
    ///
    /// Only `failed` items carrying the orphan marker are considered: those
    /// are the rotations whose original was deactivated and whose
    /// compensation write failed. Repair reactivates the original, records
    /// a `rotation_repaired` event, and retires the marker so the item is
    /// never acted on twice. Unmarked failures are left alone regardless of
    /// the number's current status. Returns the repair count.
    pub async fn reconcile(&self) -> Result<usize> {
        let failed = self.store.failed_queue_items(self.batch_size).await?;
        let mut repaired = 0;

        for item in failed {
            let Some(diagnostic) = item
                .error
                .as_deref()
                .and_then(|e| e.strip_prefix(ORPHAN_MARKER))
            else {
                continue;
            };
            let Some(mut original) = self
                .store
                .get_number(&item.owner_id, &item.number_id)
                .await?
            else {
                continue;
            };

            if original.status == NumberStatus::Inactive {
                original.status = NumberStatus::Active;
                self.store.update_number(&original).await?;
                self.store
                    .insert_spam_event(&SpamEvent {
                        id: new_id(),
                        number_id: original.id.clone(),
                        owner_id: item.owner_id.clone(),
                        event_type: "rotation_repaired".into(),
                        reason: format!("reconciled orphaned rotation {}", item.id),
                        detector: SpamDetector::Automatic,
                        context: Some(json!({ "rotation_id": item.id }).to_string()),
                        created_at: now_ts(),
                    })
                    .await?;
                repaired += 1;
                info!(rotation_id = %item.id, number_id = %original.id, "orphaned rotation repaired");
            }

            // Retire the marker; if the number is no longer inactive it was
            // already attended to and needs no repair.
            self.store
                .update_queue_item_error(&item.id, diagnostic)
                .await?;
        }

        Ok(repaired)
    }
}
