// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rotation queue operations with exclusive claim semantics.
//!
//! Claiming an item is a conditional update: `pending -> in_progress` only
//! if the row is still `pending`. Two overlapping processor runs can never
//! both act on the same item.

use rotary_core::RotaryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{QueueStatus, RotationKind, RotationQueueItem, SpamDetector};
use crate::queries::parse_enum;

const COLUMNS: &str = "id, number_id, owner_id, kind, priority, status, reason, detector, \
                       context, error, scheduled_at, started_at, completed_at";

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<RotationQueueItem, rusqlite::Error> {
    Ok(RotationQueueItem {
        id: row.get(0)?,
        number_id: row.get(1)?,
        owner_id: row.get(2)?,
        kind: parse_enum::<RotationKind>(3, row.get(3)?)?,
        priority: row.get(4)?,
        status: parse_enum::<QueueStatus>(5, row.get(5)?)?,
        reason: row.get(6)?,
        detector: parse_enum::<SpamDetector>(7, row.get(7)?)?,
        context: row.get(8)?,
        error: row.get(9)?,
        scheduled_at: row.get(10)?,
        started_at: row.get(11)?,
        completed_at: row.get(12)?,
    })
}

/// Enqueue a new rotation item.
pub async fn insert_item(db: &Database, item: &RotationQueueItem) -> Result<(), RotaryError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO rotation_queue (id, number_id, owner_id, kind, priority,
                 status, reason, detector, context, error, scheduled_at, started_at,
                 completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    item.id,
                    item.number_id,
                    item.owner_id,
                    item.kind.to_string(),
                    item.priority,
                    item.status.to_string(),
                    item.reason,
                    item.detector.to_string(),
                    item.context,
                    item.error,
                    item.scheduled_at,
                    item.started_at,
                    item.completed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Up to `limit` pending items, priority ascending then scheduled ascending.
pub async fn pending_items(
    db: &Database,
    limit: usize,
) -> Result<Vec<RotationQueueItem>, RotaryError> {
    db.connection()
        .call(move |conn| -> Result<Vec<RotationQueueItem>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM rotation_queue WHERE status = 'pending'
                 ORDER BY priority ASC, scheduled_at ASC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], row_to_item)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim an item for processing: conditional `pending -> in_progress`.
///
/// Returns `false` when another run already claimed the item (or it was
/// cancelled); the caller simply skips it.
pub async fn claim_item(db: &Database, id: &str, started_at: &str) -> Result<bool, RotaryError> {
    let id = id.to_string();
    let started_at = started_at.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE rotation_queue SET status = 'in_progress', started_at = ?2
                 WHERE id = ?1 AND status = 'pending'",
                params![id, started_at],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a claimed item to `completed`.
pub async fn complete_item(
    db: &Database,
    id: &str,
    completed_at: &str,
) -> Result<(), RotaryError> {
    let id = id.to_string();
    let completed_at = completed_at.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE rotation_queue SET status = 'completed', completed_at = ?2
                 WHERE id = ?1 AND status = 'in_progress'",
                params![id, completed_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a claimed item to `failed` with a diagnostic message.
///
/// The item is never silently dropped; the message survives for queue
/// status listings.
pub async fn fail_item(
    db: &Database,
    id: &str,
    error: &str,
    completed_at: &str,
) -> Result<(), RotaryError> {
    let id = id.to_string();
    let error = error.to_string();
    let completed_at = completed_at.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE rotation_queue SET status = 'failed', error = ?2, completed_at = ?3
                 WHERE id = ?1 AND status = 'in_progress'",
                params![id, error, completed_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Rewrite the diagnostic message of a `failed` item.
pub async fn update_item_error(db: &Database, id: &str, error: &str) -> Result<(), RotaryError> {
    let id = id.to_string();
    let error = error.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE rotation_queue SET error = ?2
                 WHERE id = ?1 AND status = 'failed'",
                params![id, error],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Cancel an owner's item while it is still `pending` or `in_progress`.
///
/// Returns `false` for terminal items and rows the owner does not hold.
pub async fn cancel_item(db: &Database, owner_id: &str, id: &str) -> Result<bool, RotaryError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    let completed_at = rotary_core::types::now_ts();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE rotation_queue SET status = 'cancelled', completed_at = ?3
                 WHERE id = ?1 AND owner_id = ?2
                   AND status IN ('pending', 'in_progress')",
                params![id, owner_id, completed_at],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All queue items for an owner, most recently scheduled first.
pub async fn items_for_owner(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<RotationQueueItem>, RotaryError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<RotationQueueItem>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM rotation_queue WHERE owner_id = ?1
                 ORDER BY scheduled_at DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], row_to_item)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Up to `limit` failed items, oldest first, for the reconciliation sweep.
pub async fn failed_items(
    db: &Database,
    limit: usize,
) -> Result<Vec<RotationQueueItem>, RotaryError> {
    db.connection()
        .call(move |conn| -> Result<Vec<RotationQueueItem>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM rotation_queue WHERE status = 'failed'
                 ORDER BY completed_at ASC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], row_to_item)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
