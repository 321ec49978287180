// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `Store` trait.

use async_trait::async_trait;

use rotary_core::error::Result;
use rotary_core::traits::Store;
use rotary_core::types::{
    AbTest, Cadence, Call, CallAttempt, Lead, NumberStatus, PhoneNumber, ReputationLog,
    RotationQueueItem, SpamEvent,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn open(path: &str) -> Result<Self> {
        let db = Database::open(path).await?;
        tracing::debug!(path, "SQLite store opened");
        Ok(Self { db })
    }

    /// Wrap an already-open database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<()> {
        self.db.close().await
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_number(&self, owner_id: &str, id: &str) -> Result<Option<PhoneNumber>> {
        queries::numbers::get_number(&self.db, owner_id, id).await
    }

    async fn insert_number(&self, number: &PhoneNumber) -> Result<()> {
        queries::numbers::insert_number(&self.db, number).await
    }

    async fn update_number(&self, number: &PhoneNumber) -> Result<()> {
        queries::numbers::update_number(&self.db, number).await
    }

    async fn list_numbers(
        &self,
        owner_id: &str,
        statuses: &[NumberStatus],
    ) -> Result<Vec<PhoneNumber>> {
        queries::numbers::list_numbers(&self.db, owner_id, statuses).await
    }

    async fn touch_last_checked(&self, id: &str, ts: &str) -> Result<()> {
        queries::numbers::touch_last_checked(&self.db, id, ts).await
    }

    async fn get_cadence(&self, owner_id: &str, id: &str) -> Result<Option<Cadence>> {
        queries::cadences::get_cadence(&self.db, owner_id, id).await
    }

    async fn insert_cadence(&self, cadence: &Cadence) -> Result<()> {
        queries::cadences::insert_cadence(&self.db, cadence).await
    }

    async fn insert_call(&self, call: &Call) -> Result<()> {
        queries::calls::insert_call(&self.db, call).await
    }

    async fn most_recent_call_for_cadence(&self, cadence_id: &str) -> Result<Option<Call>> {
        queries::calls::most_recent_call_for_cadence(&self.db, cadence_id).await
    }

    async fn calls_for_owner_since(&self, owner_id: &str, since: &str) -> Result<Vec<Call>> {
        queries::calls::calls_for_owner_since(&self.db, owner_id, since).await
    }

    async fn insert_queue_item(&self, item: &RotationQueueItem) -> Result<()> {
        queries::rotation_queue::insert_item(&self.db, item).await
    }

    async fn pending_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>> {
        queries::rotation_queue::pending_items(&self.db, limit).await
    }

    async fn claim_queue_item(&self, id: &str, started_at: &str) -> Result<bool> {
        queries::rotation_queue::claim_item(&self.db, id, started_at).await
    }

    async fn complete_queue_item(&self, id: &str, completed_at: &str) -> Result<()> {
        queries::rotation_queue::complete_item(&self.db, id, completed_at).await
    }

    async fn fail_queue_item(&self, id: &str, error: &str, completed_at: &str) -> Result<()> {
        queries::rotation_queue::fail_item(&self.db, id, error, completed_at).await
    }

    async fn cancel_queue_item(&self, owner_id: &str, id: &str) -> Result<bool> {
        queries::rotation_queue::cancel_item(&self.db, owner_id, id).await
    }

    async fn queue_items_for_owner(&self, owner_id: &str) -> Result<Vec<RotationQueueItem>> {
        queries::rotation_queue::items_for_owner(&self.db, owner_id).await
    }

    async fn failed_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>> {
        queries::rotation_queue::failed_items(&self.db, limit).await
    }

    async fn update_queue_item_error(&self, id: &str, error: &str) -> Result<()> {
        queries::rotation_queue::update_item_error(&self.db, id, error).await
    }

    async fn insert_spam_event(&self, event: &SpamEvent) -> Result<()> {
        queries::events::insert_spam_event(&self.db, event).await
    }

    async fn insert_reputation_log(&self, log: &ReputationLog) -> Result<()> {
        queries::events::insert_reputation_log(&self.db, log).await
    }

    async fn insert_ab_test(&self, test: &AbTest) -> Result<()> {
        queries::ab_tests::insert_test(&self.db, test).await
    }

    async fn insert_lead(&self, lead: &Lead) -> Result<()> {
        queries::ab_tests::insert_lead(&self.db, lead).await
    }

    async fn insert_attempt(&self, attempt: &CallAttempt) -> Result<()> {
        queries::ab_tests::insert_attempt(&self.db, attempt).await
    }

    async fn leads_for_test(&self, test_id: &str) -> Result<Vec<Lead>> {
        queries::ab_tests::leads_for_test(&self.db, test_id).await
    }

    async fn attempts_for_leads(&self, lead_ids: &[String]) -> Result<Vec<CallAttempt>> {
        queries::ab_tests::attempts_for_leads(&self.db, lead_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotary_core::types::{new_id, now_ts};
    use tempfile::tempdir;

    #[tokio::test]
    async fn store_trait_lifecycle_through_sqlite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("store.db");
        let store = SqliteStore::open(db_path.to_str().unwrap()).await.unwrap();

        let number = PhoneNumber {
            id: new_id(),
            number: "+15551112222".into(),
            provider: Some("telnyx".into()),
            status: NumberStatus::Active,
            reputation: 95.0,
            spam_reports: 0,
            owner_id: "u1".into(),
            last_checked_at: None,
            created_at: now_ts(),
        };
        store.insert_number(&number).await.unwrap();

        // `dyn Store` dispatch works end to end.
        let store: &dyn Store = &store;
        let fetched = store.get_number("u1", &number.id).await.unwrap().unwrap();
        assert_eq!(fetched.number, "+15551112222");

        let active = store.list_numbers("u1", &[NumberStatus::Active]).await.unwrap();
        assert_eq!(active.len(), 1);
    }
}
