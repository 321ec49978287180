// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number CRUD operations.

use rotary_core::RotaryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NumberStatus, PhoneNumber};
use crate::queries::parse_enum;

const COLUMNS: &str = "id, number, provider, status, reputation, spam_reports, \
                       owner_id, last_checked_at, created_at";

fn row_to_number(row: &rusqlite::Row<'_>) -> Result<PhoneNumber, rusqlite::Error> {
    let number = PhoneNumber {
        id: row.get(0)?,
        number: row.get(1)?,
        provider: row.get(2)?,
        status: parse_enum::<NumberStatus>(3, row.get(3)?)?,
        reputation: row.get(4)?,
        spam_reports: row.get(5)?,
        owner_id: row.get(6)?,
        last_checked_at: row.get(7)?,
        created_at: row.get(8)?,
    };
    // Clamp on hydration so a corrupt row cannot leak an out-of-range score.
    Ok(number.validated())
}

/// Insert a new phone number.
pub async fn insert_number(db: &Database, number: &PhoneNumber) -> Result<(), RotaryError> {
    let number = number.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO phone_numbers (id, number, provider, status, reputation,
                 spam_reports, owner_id, last_checked_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    number.id,
                    number.number,
                    number.provider,
                    number.status.to_string(),
                    number.reputation,
                    number.spam_reports,
                    number.owner_id,
                    number.last_checked_at,
                    number.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one number by owner and id.
pub async fn get_number(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<PhoneNumber>, RotaryError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<PhoneNumber>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM phone_numbers WHERE owner_id = ?1 AND id = ?2"
            ))?;
            let result = stmt.query_row(params![owner_id, id], row_to_number);
            match result {
                Ok(number) => Ok(Some(number)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full-row update keyed by id.
pub async fn update_number(db: &Database, number: &PhoneNumber) -> Result<(), RotaryError> {
    let number = number.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE phone_numbers SET number = ?2, provider = ?3, status = ?4,
                 reputation = ?5, spam_reports = ?6, owner_id = ?7,
                 last_checked_at = ?8 WHERE id = ?1",
                params![
                    number.id,
                    number.number,
                    number.provider,
                    number.status.to_string(),
                    number.reputation,
                    number.spam_reports,
                    number.owner_id,
                    number.last_checked_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List an owner's numbers with status in `statuses`, creation time ascending.
pub async fn list_numbers(
    db: &Database,
    owner_id: &str,
    statuses: &[NumberStatus],
) -> Result<Vec<PhoneNumber>, RotaryError> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let owner_id = owner_id.to_string();
    let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
    db.connection()
        .call(move |conn| -> Result<Vec<PhoneNumber>, rusqlite::Error> {
            let placeholders = (0..statuses.len())
                .map(|i| format!("?{}", i + 2))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM phone_numbers
                 WHERE owner_id = ?1 AND status IN ({placeholders})
                 ORDER BY created_at ASC"
            ))?;
            let mut values: Vec<String> = vec![owner_id];
            values.extend(statuses);
            let rows = stmt.query_map(rusqlite::params_from_iter(values), row_to_number)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update only the `last_checked_at` field.
pub async fn touch_last_checked(db: &Database, id: &str, ts: &str) -> Result<(), RotaryError> {
    let id = id.to_string();
    let ts = ts.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE phone_numbers SET last_checked_at = ?2 WHERE id = ?1",
                params![id, ts],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
