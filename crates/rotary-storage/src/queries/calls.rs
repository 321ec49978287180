// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call log operations.
//!
//! Calls are append-only: there is deliberately no update or delete here.
//! Round-robin position lookup reads "most recent call for a cadence" by
//! descending created_at, never relying on insertion order.

use rotary_core::RotaryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Call, CallOutcome};
use crate::queries::parse_enum;

const COLUMNS: &str = "id, number_id, cadence_id, destination, outcome, duration_secs, \
                       cost, owner_id, created_at";

fn row_to_call(row: &rusqlite::Row<'_>) -> Result<Call, rusqlite::Error> {
    Ok(Call {
        id: row.get(0)?,
        number_id: row.get(1)?,
        cadence_id: row.get(2)?,
        destination: row.get(3)?,
        outcome: parse_enum::<CallOutcome>(4, row.get(4)?)?,
        duration_secs: row.get(5)?,
        cost: row.get(6)?,
        owner_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Append a call record.
pub async fn insert_call(db: &Database, call: &Call) -> Result<(), RotaryError> {
    let call = call.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO calls (id, number_id, cadence_id, destination, outcome,
                 duration_secs, cost, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    call.id,
                    call.number_id,
                    call.cadence_id,
                    call.destination,
                    call.outcome.to_string(),
                    call.duration_secs,
                    call.cost,
                    call.owner_id,
                    call.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent call logged against a cadence.
pub async fn most_recent_call_for_cadence(
    db: &Database,
    cadence_id: &str,
) -> Result<Option<Call>, RotaryError> {
    let cadence_id = cadence_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Call>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM calls WHERE cadence_id = ?1
                 ORDER BY created_at DESC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![cadence_id], row_to_call);
            match result {
                Ok(call) => Ok(Some(call)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All of an owner's calls with `created_at >= since`, ascending.
pub async fn calls_for_owner_since(
    db: &Database,
    owner_id: &str,
    since: &str,
) -> Result<Vec<Call>, RotaryError> {
    let owner_id = owner_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Call>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM calls
                 WHERE owner_id = ?1 AND created_at >= ?2
                 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![owner_id, since], row_to_call)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
