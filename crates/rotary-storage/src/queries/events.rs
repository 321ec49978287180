// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit records: spam events and the reputation log.

use rotary_core::RotaryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ReputationLog, SpamEvent};

/// Append a spam event.
pub async fn insert_spam_event(db: &Database, event: &SpamEvent) -> Result<(), RotaryError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO spam_events (id, number_id, owner_id, event_type, reason,
                 detector, context, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    event.id,
                    event.number_id,
                    event.owner_id,
                    event.event_type,
                    event.reason,
                    event.detector.to_string(),
                    event.context,
                    event.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append a reputation change record.
pub async fn insert_reputation_log(db: &Database, log: &ReputationLog) -> Result<(), RotaryError> {
    let log = log.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO reputation_log (id, number_id, old_score, new_score, reason,
                 source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    log.id,
                    log.number_id,
                    log.old_score,
                    log.new_score,
                    log.reason,
                    log.source.to_string(),
                    log.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotary_core::types::{ReputationSource, SpamDetector, new_id, now_ts};
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
            reputation: 80.0,
            spam_reports: 0,
            owner_id: "u1".into(),
            last_checked_at: None,
            created_at: now_ts(),
        };
        crate::queries::numbers::insert_number(db, &n).await.unwrap();
    }

    #[tokio::test]
    async fn spam_event_insert_persists_all_fields() {
        let (db, _dir) = setup_db().await;
        seed_number(&db, "n-1").await;

        let event = SpamEvent {
            id: new_id(),
            number_id: "n-1".into(),
            owner_id: "u1".into(),
            event_type: "rotation_completed".into(),
            reason: "spam flagged".into(),
            detector: SpamDetector::Api,
            context: Some(r#"{"replacement_id":"n-2"}"#.into()),
            created_at: now_ts(),
        };
        insert_spam_event(&db, &event).await.unwrap();

        let (event_type, context): (String, Option<String>) = db
            .connection()
            .call(move |conn| -> Result<_, rusqlite::Error> {
                conn.query_row(
                    "SELECT event_type, context FROM spam_events WHERE number_id = 'n-1'",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap();
        assert_eq!(event_type, "rotation_completed");
        assert!(context.unwrap().contains("n-2"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reputation_log_insert_persists_scores() {
        let (db, _dir) = setup_db().await;
        seed_number(&db, "n-1").await;

        let log = ReputationLog {
            id: new_id(),
            number_id: "n-1".into(),
            old_score: 80.0,
            new_score: 55.0,
            reason: "call outcome: spam_detected".into(),
            source: ReputationSource::CallOutcome,
            created_at: now_ts(),
        };
        insert_reputation_log(&db, &log).await.unwrap();

        let (old, new, source): (f64, f64, String) = db
            .connection()
            .call(move |conn| -> Result<_, rusqlite::Error> {
                conn.query_row(
                    "SELECT old_score, new_score, source FROM reputation_log
                     WHERE number_id = 'n-1'",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
            })
            .await
            .unwrap();
        assert_eq!(old, 80.0);
        assert_eq!(new, 55.0);
        assert_eq!(source, "call_outcome");

        db.close().await.unwrap();
    }
}
