// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `Store` fake for deterministic engine tests.
//!
//! Mirrors the ordering and claim semantics of the SQLite store so engine
//! tests exercise the same contract without a database file. Write-failure
//! injection lets tests drive the queue processor's rollback path.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::Store;
use rotary_core::types::{
    AbTest, Cadence, Call, CallAttempt, Lead, NumberStatus, PhoneNumber, QueueStatus,
    ReputationLog, RotationQueueItem, SpamEvent, now_ts,
};

#[derive(Default)]
struct Inner {
    numbers: HashMap<String, PhoneNumber>,
    cadences: HashMap<String, Cadence>,
    calls: Vec<Call>,
    queue: HashMap<String, RotationQueueItem>,
    spam_events: Vec<SpamEvent>,
    reputation_log: Vec<ReputationLog>,
    ab_tests: Vec<AbTest>,
    leads: Vec<Lead>,
    attempts: Vec<CallAttempt>,
    // Failure injection: per-number count of `update_number` calls still
    // allowed to succeed before failing.
    update_allowances: HashMap<String, usize>,
    fail_spam_event_inserts: bool,
}

/// In-memory implementation of the `Store` trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `update_number` for `id` fail with a storage
    /// error, until [`clear_failures`](Self::clear_failures) is called.
    pub async fn fail_updates_for(&self, id: &str) {
        self.fail_updates_for_after(id, 0).await;
    }

    /// Let the next `allowed` `update_number` calls for `id` succeed, then
    /// fail every one after that. Lets a test land the forward write of a
    /// swap while its compensation write fails.
    pub async fn fail_updates_for_after(&self, id: &str, allowed: usize) {
        self.inner
            .lock()
            .await
            .update_allowances
            .insert(id.to_string(), allowed);
    }

    /// Make every subsequent `insert_spam_event` fail.
    pub async fn fail_spam_event_inserts(&self) {
        self.inner.lock().await.fail_spam_event_inserts = true;
    }

    /// Clear all injected failures.
    pub async fn clear_failures(&self) {
        let mut inner = self.inner.lock().await;
        inner.update_allowances.clear();
        inner.fail_spam_event_inserts = false;
    }

    /// Snapshot of all recorded spam events.
    pub async fn spam_events(&self) -> Vec<SpamEvent> {
        self.inner.lock().await.spam_events.clone()
    }

    /// Snapshot of the reputation change log.
    pub async fn reputation_log(&self) -> Vec<ReputationLog> {
        self.inner.lock().await.reputation_log.clone()
    }

    /// Snapshot of the append-only call log.
    pub async fn calls(&self) -> Vec<Call> {
        self.inner.lock().await.calls.clone()
    }

    /// Fetch a queue item regardless of owner (test inspection).
    pub async fn queue_item(&self, id: &str) -> Option<RotationQueueItem> {
        self.inner.lock().await.queue.get(id).cloned()
    }

    fn write_failure(context: &str) -> RotaryError {
        RotaryError::Storage {
            source: format!("injected write failure: {context}").into(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_number(&self, owner_id: &str, id: &str) -> Result<Option<PhoneNumber>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .numbers
            .get(id)
            .filter(|n| n.owner_id == owner_id)
            .cloned())
    }

    async fn insert_number(&self, number: &PhoneNumber) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.numbers.insert(number.id.clone(), number.clone());
        Ok(())
    }

    async fn update_number(&self, number: &PhoneNumber) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(allowed) = inner.update_allowances.get_mut(&number.id) {
            if *allowed == 0 {
                return Err(Self::write_failure(&format!("update {}", number.id)));
            }
            *allowed -= 1;
        }
        match inner.numbers.get_mut(&number.id) {
            Some(existing) => {
                *existing = number.clone();
                Ok(())
            }
            None => Err(RotaryError::NotFound {
                entity: "phone_number",
                id: number.id.clone(),
            }),
        }
    }

    async fn list_numbers(
        &self,
        owner_id: &str,
        statuses: &[NumberStatus],
    ) -> Result<Vec<PhoneNumber>> {
        let inner = self.inner.lock().await;
        let mut numbers: Vec<PhoneNumber> = inner
            .numbers
            .values()
            .filter(|n| n.owner_id == owner_id && statuses.contains(&n.status))
            .cloned()
            .collect();
        numbers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(numbers)
    }

    async fn touch_last_checked(&self, id: &str, ts: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(number) = inner.numbers.get_mut(id) {
            number.last_checked_at = Some(ts.to_string());
        }
        Ok(())
    }

    async fn get_cadence(&self, owner_id: &str, id: &str) -> Result<Option<Cadence>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .cadences
            .get(id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn insert_cadence(&self, cadence: &Cadence) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.cadences.insert(cadence.id.clone(), cadence.clone());
        Ok(())
    }

    async fn insert_call(&self, call: &Call) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(call.clone());
        Ok(())
    }

    async fn most_recent_call_for_cadence(&self, cadence_id: &str) -> Result<Option<Call>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .calls
            .iter()
            .filter(|c| c.cadence_id.as_deref() == Some(cadence_id))
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .cloned())
    }

    async fn calls_for_owner_since(&self, owner_id: &str, since: &str) -> Result<Vec<Call>> {
        let inner = self.inner.lock().await;
        let mut calls: Vec<Call> = inner
            .calls
            .iter()
            .filter(|c| c.owner_id == owner_id && c.created_at.as_str() >= since)
            .cloned()
            .collect();
        calls.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(calls)
    }

    async fn insert_queue_item(&self, item: &RotationQueueItem) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.queue.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn pending_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>> {
        let inner = self.inner.lock().await;
        let mut items: Vec<RotationQueueItem> = inner
            .queue
            .values()
            .filter(|i| i.status == QueueStatus::Pending)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.scheduled_at.cmp(&b.scheduled_at))
        });
        items.truncate(limit);
        Ok(items)
    }

    async fn claim_queue_item(&self, id: &str, started_at: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        match inner.queue.get_mut(id) {
            Some(item) if item.status == QueueStatus::Pending => {
                item.status = QueueStatus::InProgress;
                item.started_at = Some(started_at.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_queue_item(&self, id: &str, completed_at: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(item) = inner.queue.get_mut(id)
            && item.status == QueueStatus::InProgress
        {
            item.status = QueueStatus::Completed;
            item.completed_at = Some(completed_at.to_string());
        }
        Ok(())
    }

    async fn fail_queue_item(&self, id: &str, error: &str, completed_at: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(item) = inner.queue.get_mut(id)
            && item.status == QueueStatus::InProgress
        {
            item.status = QueueStatus::Failed;
            item.error = Some(error.to_string());
            item.completed_at = Some(completed_at.to_string());
        }
        Ok(())
    }

    async fn cancel_queue_item(&self, owner_id: &str, id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        match inner.queue.get_mut(id) {
            Some(item) if item.owner_id == owner_id && !item.status.is_terminal() => {
                item.status = QueueStatus::Cancelled;
                item.completed_at = Some(now_ts());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn queue_items_for_owner(&self, owner_id: &str) -> Result<Vec<RotationQueueItem>> {
        let inner = self.inner.lock().await;
        let mut items: Vec<RotationQueueItem> = inner
            .queue
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(items)
    }

    async fn failed_queue_items(&self, limit: usize) -> Result<Vec<RotationQueueItem>> {
        let inner = self.inner.lock().await;
        let mut items: Vec<RotationQueueItem> = inner
            .queue
            .values()
            .filter(|i| i.status == QueueStatus::Failed)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.completed_at.cmp(&b.completed_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn update_queue_item_error(&self, id: &str, error: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(item) = inner.queue.get_mut(id)
            && item.status == QueueStatus::Failed
        {
            item.error = Some(error.to_string());
        }
        Ok(())
    }

    async fn insert_spam_event(&self, event: &SpamEvent) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.fail_spam_event_inserts {
            return Err(Self::write_failure("insert spam_event"));
        }
        inner.spam_events.push(event.clone());
        Ok(())
    }

    async fn insert_reputation_log(&self, log: &ReputationLog) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.reputation_log.push(log.clone());
        Ok(())
    }

    async fn insert_ab_test(&self, test: &AbTest) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.ab_tests.push(test.clone());
        Ok(())
    }

    async fn insert_lead(&self, lead: &Lead) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.leads.push(lead.clone());
        Ok(())
    }

    async fn insert_attempt(&self, attempt: &CallAttempt) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.attempts.push(attempt.clone());
        Ok(())
    }

    async fn leads_for_test(&self, test_id: &str) -> Result<Vec<Lead>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .leads
            .iter()
            .filter(|l| l.test_id == test_id)
            .cloned()
            .collect())
    }

    async fn attempts_for_leads(&self, lead_ids: &[String]) -> Result<Vec<CallAttempt>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attempts
            .iter()
            .filter(|a| lead_ids.contains(&a.lead_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn claim_is_exclusive_and_terminal_items_stay_terminal() {
        let store = MemoryStore::new();
        let item = fixtures::queue_item("n-1", "u1", 10);
        store.insert_queue_item(&item).await.unwrap();

        assert!(store.claim_queue_item(&item.id, &now_ts()).await.unwrap());
        assert!(!store.claim_queue_item(&item.id, &now_ts()).await.unwrap());

        store.complete_queue_item(&item.id, &now_ts()).await.unwrap();
        let stored = store.queue_item(&item.id).await.unwrap();
        assert_eq!(stored.status, QueueStatus::Completed);
        assert!(!store.claim_queue_item(&item.id, &now_ts()).await.unwrap());
    }

    #[tokio::test]
    async fn injected_update_failure_surfaces_as_storage_error() {
        let store = MemoryStore::new();
        let number = fixtures::phone_number("u1", NumberStatus::Active, 90.0);
        store.insert_number(&number).await.unwrap();

        store.fail_updates_for(&number.id).await;
        let err = store.update_number(&number).await.unwrap_err();
        assert!(matches!(err, RotaryError::Storage { .. }));

        store.clear_failures().await;
        store.update_number(&number).await.unwrap();
    }

    #[tokio::test]
    async fn update_allowance_fails_after_permitted_writes() {
        let store = MemoryStore::new();
        let number = fixtures::phone_number("u1", NumberStatus::Active, 90.0);
        store.insert_number(&number).await.unwrap();

        store.fail_updates_for_after(&number.id, 1).await;
        store.update_number(&number).await.unwrap();
        let err = store.update_number(&number).await.unwrap_err();
        assert!(matches!(err, RotaryError::Storage { .. }));
    }

    #[tokio::test]
    async fn list_numbers_is_creation_ordered() {
        let store = MemoryStore::new();
        let mut older = fixtures::phone_number("u1", NumberStatus::Active, 50.0);
        older.created_at = "2024-01-01T00:00:00.000Z".into();
        let mut newer = fixtures::phone_number("u1", NumberStatus::Active, 50.0);
        newer.created_at = "2024-06-01T00:00:00.000Z".into();

        store.insert_number(&newer).await.unwrap();
        store.insert_number(&older).await.unwrap();

        let listed = store.list_numbers("u1", &[NumberStatus::Active]).await.unwrap();
        assert_eq!(listed[0].id, older.id);
        assert_eq!(listed[1].id, newer.id);
    }
}
