// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `RotationService`: the engine's single entry point.
//!
//! Owns the store handle, config, validation providers, and the random
//! source. All operations return explicit `Result`s so an API layer can map
//! failures to responses uniformly.

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use rotary_config::RotaryConfig;
use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::{SpamValidator, Store};
use rotary_core::types::{
    Call, CallOutcome, PhoneNumber, NumberStatus, RotationQueueItem, RotationResult, SpamVerdict,
    TestGroup, new_id, now_ts,
};

use crate::queue::{ProcessReport, QueueProcessor, RotationRequest};
use crate::stats::{self, Metrics, Timeframe};
use crate::{reputation, selector, validate};

/// One call to record via [`RotationService::log_call`].
#[derive(Debug, Clone)]
pub struct CallEntry {
    pub number_id: String,
    pub cadence_id: Option<String>,
    pub destination: String,
    pub outcome: CallOutcome,
    pub duration_secs: f64,
    pub cost: f64,
}

/// Per-group A/B test metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestMetrics {
    pub overall: Metrics,
    pub group_a: Metrics,
    pub group_b: Metrics,
}

pub struct RotationService {
    store: Arc<dyn Store>,
    config: RotaryConfig,
    validators: Vec<Arc<dyn SpamValidator>>,
    queue: QueueProcessor,
    rng: Mutex<StdRng>,
}

impl RotationService {
    pub fn new(store: Arc<dyn Store>, config: RotaryConfig) -> Self {
        let queue = QueueProcessor::new(store.clone(), config.rotation.batch_size);
        Self {
            store,
            config,
            validators: Vec::new(),
            queue,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Attach SPAM-validation providers.
    pub fn with_validators(mut self, validators: Vec<Arc<dyn SpamValidator>>) -> Self {
        self.validators = validators;
        self
    }

    /// Seed the random source, for reproducible selection in tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Record a call and apply its outcome to the number's reputation.
    ///
    /// The call row is appended first (the audit trail is the input to
    /// reputation, not the other way around); the reputation update then
    /// runs before this returns. Returns the number post-update.
    pub async fn log_call(&self, owner_id: &str, entry: CallEntry) -> Result<PhoneNumber> {
        // Reject unknown or foreign numbers before writing anything.
        self.store
            .get_number(owner_id, &entry.number_id)
            .await?
            .ok_or_else(|| RotaryError::NotFound {
                entity: "phone_number",
                id: entry.number_id.clone(),
            })?;

        let call = Call {
            id: new_id(),
            number_id: entry.number_id.clone(),
            cadence_id: entry.cadence_id,
            destination: entry.destination,
            outcome: entry.outcome,
            duration_secs: entry.duration_secs,
            cost: entry.cost,
            owner_id: owner_id.to_string(),
            created_at: now_ts(),
        };
        self.store.insert_call(&call).await?;

        reputation::apply_call_outcome(
            self.store.as_ref(),
            &self.config.reputation,
            owner_id,
            &entry.number_id,
            entry.outcome,
        )
        .await
    }

    /// Pick the next number to dial for a cadence.
    ///
    /// The eligible pool is the cadence's members that are currently
    /// `active`, kept in cadence order. The selected number gets its
    /// `last_checked_at` stamped.
    pub async fn select_next(&self, owner_id: &str, cadence_id: &str) -> Result<RotationResult> {
        let cadence = self
            .store
            .get_cadence(owner_id, cadence_id)
            .await?
            .ok_or_else(|| RotaryError::NotFound {
                entity: "cadence",
                id: cadence_id.to_string(),
            })?;

        let strategy = selector::resolve_strategy(
            &cadence.strategy,
            self.config.rotation.legacy_strategy_fallback,
        )?;

        let active = self
            .store
            .list_numbers(owner_id, &[NumberStatus::Active])
            .await?;
        // Cadence order is the pool order round-robin cycles through.
        let pool: Vec<PhoneNumber> = cadence
            .number_ids
            .iter()
            .filter_map(|id| active.iter().find(|n| &n.id == id).cloned())
            .collect();
        if pool.is_empty() {
            return Err(RotaryError::NoAvailableNumbers {
                owner_id: owner_id.to_string(),
            });
        }

        let last_used = self
            .store
            .most_recent_call_for_cadence(&cadence.id)
            .await?
            .map(|c| c.number_id);

        // Narrow lock scope: the guard must not live across an await.
        let chosen = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            selector::select_next(strategy, &pool, last_used.as_deref(), &mut *rng).cloned()
        };
        let Some(number) = chosen else {
            return Err(RotaryError::NoAvailableNumbers {
                owner_id: owner_id.to_string(),
            });
        };

        self.store.touch_last_checked(&number.id, &now_ts()).await?;
        info!(cadence_id, number_id = %number.id, strategy = %strategy, "number selected");

        Ok(RotationResult {
            number,
            strategy,
            pool_size: pool.len(),
        })
    }

    /// Process one batch of pending rotation queue items.
    pub async fn process_queue(&self) -> Result<ProcessReport> {
        self.queue.process_queue().await
    }

    /// Repair orphaned half-completed rotations. Returns the repair count.
    pub async fn reconcile(&self) -> Result<usize> {
        self.queue.reconcile().await
    }

    /// Enqueue a rotation for a number. Returns the rotation id.
    pub async fn add_to_queue(&self, request: RotationRequest) -> Result<String> {
        self.queue.add_to_queue(request).await
    }

    /// Cancel a queued rotation, owner-guarded.
    pub async fn cancel(&self, rotation_id: &str, owner_id: &str) -> Result<bool> {
        self.queue.cancel(rotation_id, owner_id).await
    }

    /// All queue items for an owner, most recently scheduled first.
    pub async fn queue_status(&self, owner_id: &str) -> Result<Vec<RotationQueueItem>> {
        self.queue.queue_status(owner_id).await
    }

    /// Summarize an owner's calls over a reporting window.
    pub async fn get_stats(&self, owner_id: &str, timeframe: Timeframe) -> Result<Metrics> {
        let calls = self
            .store
            .calls_for_owner_since(owner_id, &timeframe.since())
            .await?;
        Ok(stats::call_summary(&calls))
    }

    /// Per-group and overall metrics for an A/B test.
    pub async fn test_metrics(&self, test_id: &str) -> Result<TestMetrics> {
        let leads = self.store.leads_for_test(test_id).await?;
        let lead_ids: Vec<String> = leads.iter().map(|l| l.id.clone()).collect();
        let attempts = self.store.attempts_for_leads(&lead_ids).await?;

        Ok(TestMetrics {
            overall: stats::aggregate(&leads, &attempts, None),
            group_a: stats::aggregate(&leads, &attempts, Some(TestGroup::A)),
            group_b: stats::aggregate(&leads, &attempts, Some(TestGroup::B)),
        })
    }

    /// Run SPAM validation for a number and persist the combined verdict.
    pub async fn validate_number(&self, owner_id: &str, number_id: &str) -> Result<SpamVerdict> {
        validate::apply_validation(self.store.as_ref(), &self.validators, owner_id, number_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotary_test_utils::{MemoryStore, fixtures};

    fn service(store: Arc<MemoryStore>) -> RotationService {
        RotationService::new(store, RotaryConfig::default()).with_rng_seed(7)
    }

    #[tokio::test]
    async fn log_call_rejects_unknown_number_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let err = service
            .log_call(
                "u1",
                CallEntry {
                    number_id: "ghost".into(),
                    cadence_id: None,
                    destination: "+15559998888".into(),
                    outcome: CallOutcome::Success,
                    duration_secs: 10.0,
                    cost: 0.01,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RotaryError::NotFound { .. }));
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn log_call_appends_call_and_updates_reputation() {
        let store = Arc::new(MemoryStore::new());
        let mut number = fixtures::phone_number("u1", NumberStatus::Active, 50.0);
        number.id = "n1".into();
        store.insert_number(&number).await.unwrap();

        let service = service(store.clone());
        let updated = service
            .log_call(
                "u1",
                CallEntry {
                    number_id: "n1".into(),
                    cadence_id: None,
                    destination: "+15559998888".into(),
                    outcome: CallOutcome::Success,
                    duration_secs: 32.0,
                    cost: 0.02,
                },
            )
            .await
            .unwrap();

        // Default success step is +2.
        assert!((updated.reputation - 52.0).abs() < 1e-9);
        assert_eq!(store.calls().await.len(), 1);
        assert_eq!(store.reputation_log().await.len(), 1);
    }

    #[tokio::test]
    async fn select_next_unknown_cadence_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store);
        let err = service.select_next("u1", "ghost").await.unwrap_err();
        assert!(matches!(err, RotaryError::NotFound { entity: "cadence", .. }));
    }

    #[tokio::test]
    async fn select_next_empty_active_pool_is_no_available_numbers() {
        let store = Arc::new(MemoryStore::new());
        let mut number = fixtures::phone_number("u1", NumberStatus::Inactive, 50.0);
        number.id = "n1".into();
        store.insert_number(&number).await.unwrap();
        let cadence = fixtures::cadence("u1", "round_robin", &["n1"]);
        store.insert_cadence(&cadence).await.unwrap();

        let service = service(store);
        let err = service.select_next("u1", &cadence.id).await.unwrap_err();
        assert!(matches!(err, RotaryError::NoAvailableNumbers { .. }));
    }

    #[tokio::test]
    async fn select_next_invalid_strategy_surfaces_by_default() {
        let store = Arc::new(MemoryStore::new());
        let mut number = fixtures::phone_number("u1", NumberStatus::Active, 50.0);
        number.id = "n1".into();
        store.insert_number(&number).await.unwrap();
        let cadence = fixtures::cadence("u1", "fastest", &["n1"]);
        store.insert_cadence(&cadence).await.unwrap();

        let service = service(store.clone());
        let err = service.select_next("u1", &cadence.id).await.unwrap_err();
        assert!(matches!(err, RotaryError::InvalidStrategy(_)));

        // With the legacy flag the same cadence behaves as round_robin.
        let mut config = RotaryConfig::default();
        config.rotation.legacy_strategy_fallback = true;
        let legacy = RotationService::new(store, config).with_rng_seed(7);
        let result = legacy.select_next("u1", &cadence.id).await.unwrap();
        assert_eq!(result.number.id, "n1");
        assert_eq!(result.strategy, rotary_core::types::RotationStrategy::RoundRobin);
    }

    #[tokio::test]
    async fn select_next_stamps_last_checked() {
        let store = Arc::new(MemoryStore::new());
        let mut number = fixtures::phone_number("u1", NumberStatus::Active, 50.0);
        number.id = "n1".into();
        store.insert_number(&number).await.unwrap();
        let cadence = fixtures::cadence("u1", "round_robin", &["n1"]);
        store.insert_cadence(&cadence).await.unwrap();

        let service = service(store.clone());
        let result = service.select_next("u1", &cadence.id).await.unwrap();
        assert_eq!(result.pool_size, 1);

        let stored = store.get_number("u1", "n1").await.unwrap().unwrap();
        assert!(stored.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn test_metrics_splits_by_group() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        for (id, group, converted) in
            [("a1", TestGroup::A, true), ("b1", TestGroup::B, false)]
        {
            store
                .insert_lead(&rotary_core::types::Lead {
                    id: id.into(),
                    test_id: "t1".into(),
                    group,
                    converted,
                    owner_id: "u1".into(),
                    created_at: now_ts(),
                })
                .await
                .unwrap();
            store
                .insert_attempt(&rotary_core::types::CallAttempt {
                    id: new_id(),
                    lead_id: id.into(),
                    answered: converted,
                    duration_secs: if converted { 20.0 } else { 0.0 },
                    spam_checked: false,
                    spam_score: None,
                    blocked: false,
                    created_at: now_ts(),
                })
                .await
                .unwrap();
        }

        let metrics = service.test_metrics("t1").await.unwrap();
        assert_eq!(metrics.overall.total_leads, 2);
        assert_eq!(metrics.group_a.conversion_rate, 100.0);
        assert_eq!(metrics.group_b.conversion_rate, 0.0);
    }
}
