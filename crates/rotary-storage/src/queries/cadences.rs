// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadence CRUD operations.
//!
//! A cadence row plus its ordered membership rows hydrate into one
//! [`Cadence`] with `number_ids` in pool order.

use rotary_core::RotaryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Cadence;

/// Insert a cadence and its ordered number membership atomically.
pub async fn insert_cadence(db: &Database, cadence: &Cadence) -> Result<(), RotaryError> {
    let cadence = cadence.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO cadences (id, name, strategy, active, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    cadence.id,
                    cadence.name,
                    cadence.strategy,
                    cadence.active,
                    cadence.owner_id,
                    cadence.created_at,
                ],
            )?;
            for (position, number_id) in cadence.number_ids.iter().enumerate() {
                tx.execute(
                    "INSERT INTO cadence_numbers (cadence_id, number_id, position)
                     VALUES (?1, ?2, ?3)",
                    params![cadence.id, number_id, position as i64],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a cadence by owner and id, with members in pool order.
pub async fn get_cadence(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<Cadence>, RotaryError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Cadence>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT id, name, strategy, active, owner_id, created_at
                 FROM cadences WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, id],
                |row| {
                    Ok(Cadence {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        number_ids: Vec::new(),
                        strategy: row.get(2)?,
                        active: row.get(3)?,
                        owner_id: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            );
            let mut cadence = match result {
                Ok(cadence) => cadence,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e),
            };

            let mut stmt = conn.prepare(
                "SELECT number_id FROM cadence_numbers
                 WHERE cadence_id = ?1 ORDER BY position ASC",
            )?;
            let rows = stmt.query_map(params![cadence.id], |row| row.get::<_, String>(0))?;
            cadence.number_ids = rows.collect::<Result<Vec<_>, _>>()?;

            Ok(Some(cadence))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotary_core::types::{new_id, now_ts};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_number(db: &Database, id: &str) {
        let n = crate::models::PhoneNumber {
            id: id.to_string(),
            number: "+15550000000".into(),
            provider: None,
            status: crate::models::NumberStatus::Active,
            reputation: 100.0,
            spam_reports: 0,
            owner_id: "u1".into(),
            last_checked_at: None,
            created_at: now_ts(),
        };
        crate::queries::numbers::insert_number(db, &n).await.unwrap();
    }

    #[tokio::test]
    async fn insert_and_get_preserves_member_order() {
        let (db, _dir) = setup_db().await;
        for id in ["n-b", "n-a", "n-c"] {
            seed_number(&db, id).await;
        }

        let cadence = Cadence {
            id: new_id(),
            name: "outbound".into(),
            number_ids: vec!["n-b".into(), "n-a".into(), "n-c".into()],
            strategy: "round_robin".into(),
            active: true,
            owner_id: "u1".into(),
            created_at: now_ts(),
        };
        insert_cadence(&db, &cadence).await.unwrap();

        let fetched = get_cadence(&db, "u1", &cadence.id).await.unwrap().unwrap();
        assert_eq!(fetched.number_ids, vec!["n-b", "n-a", "n-c"]);
        assert_eq!(fetched.strategy, "round_robin");
        assert!(fetched.active);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_or_unowned_returns_none() {
        let (db, _dir) = setup_db().await;
        seed_number(&db, "n-1").await;

        let cadence = Cadence {
            id: new_id(),
            name: "solo".into(),
            number_ids: vec!["n-1".into()],
            strategy: "random".into(),
            active: true,
            owner_id: "u1".into(),
            created_at: now_ts(),
        };
        insert_cadence(&db, &cadence).await.unwrap();

        assert!(get_cadence(&db, "u1", "nope").await.unwrap().is_none());
        assert!(get_cadence(&db, "u2", &cadence.id).await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
