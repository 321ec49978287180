// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture builders for engine and storage tests.

use rotary_core::types::{
    Cadence, Call, CallOutcome, NumberStatus, PhoneNumber, QueueStatus, RotationKind,
    RotationQueueItem, SpamDetector, new_id, now_ts,
};

/// A phone number owned by `owner` with the given status and reputation.
pub fn phone_number(owner: &str, status: NumberStatus, reputation: f64) -> PhoneNumber {
    PhoneNumber {
        id: new_id(),
        number: "+15550001111".into(),
        provider: Some("twilio".into()),
        status,
        reputation,
        spam_reports: 0,
        owner_id: owner.into(),
        last_checked_at: None,
        created_at: now_ts(),
    }
}

/// A cadence over the given member ids, in pool order.
pub fn cadence(owner: &str, strategy: &str, number_ids: &[&str]) -> Cadence {
    Cadence {
        id: new_id(),
        name: "test cadence".into(),
        number_ids: number_ids.iter().map(|s| s.to_string()).collect(),
        strategy: strategy.into(),
        active: true,
        owner_id: owner.into(),
        created_at: now_ts(),
    }
}

/// A call against `number_id` through `cadence_id` at `created_at`.
pub fn call(owner: &str, number_id: &str, cadence_id: &str, created_at: &str) -> Call {
    Call {
        id: new_id(),
        number_id: number_id.into(),
        cadence_id: Some(cadence_id.into()),
        destination: "+15559998888".into(),
        outcome: CallOutcome::Success,
        duration_secs: 25.0,
        cost: 0.012,
        owner_id: owner.into(),
        created_at: created_at.into(),
    }
}

/// A pending spam-rotation queue item for `number_id`.
pub fn queue_item(number_id: &str, owner: &str, priority: i64) -> RotationQueueItem {
    RotationQueueItem {
        id: new_id(),
        number_id: number_id.into(),
        owner_id: owner.into(),
        kind: RotationKind::SpamRotation,
        priority,
        status: QueueStatus::Pending,
        reason: "flagged by provider".into(),
        detector: SpamDetector::Api,
        context: None,
        error: None,
        scheduled_at: now_ts(),
        started_at: None,
        completed_at: None,
    }
}
