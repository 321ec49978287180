// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reputation scoring for phone numbers.
//!
//! Successful outcomes move the score toward 100, spam detection drops it
//! sharply, and the neutral failures (failed/busy/no_answer) apply a small
//! decay. Scores saturate at the [0, 100] bounds; more negative outcomes
//! never increase the score.

use tracing::debug;

use rotary_config::ReputationConfig;
use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::Store;
use rotary_core::types::{
    CallOutcome, NumberStatus, PhoneNumber, ReputationLog, ReputationSource, clamp_score,
    new_id, now_ts,
};

/// Compute the new reputation score after one call outcome.
///
/// Pure: the caller persists the result. The previous score is clamped on
/// the way in so a corrupt input cannot widen the output range.
pub fn compute_reputation(previous: f64, outcome: CallOutcome, policy: &ReputationConfig) -> f64 {
    let previous = clamp_score(previous);
    let delta = match outcome {
        CallOutcome::Success => policy.success_step,
        CallOutcome::Failed | CallOutcome::Busy | CallOutcome::NoAnswer => -policy.neutral_decay,
        CallOutcome::SpamDetected => -policy.spam_penalty,
    };
    clamp_score(previous + delta)
}

/// Apply a call outcome to a number's persisted reputation.
///
/// Loads the number (a missing number is `NotFound`, a declined no-op that
/// touches nothing else), persists the new score, and appends a
/// [`ReputationLog`] record. `spam_detected` is the only outcome that also
/// forces the status to `spam`.
pub async fn apply_call_outcome(
    store: &dyn Store,
    policy: &ReputationConfig,
    owner_id: &str,
    number_id: &str,
    outcome: CallOutcome,
) -> Result<PhoneNumber> {
    let mut number = store
        .get_number(owner_id, number_id)
        .await?
        .ok_or_else(|| RotaryError::NotFound {
            entity: "phone_number",
            id: number_id.to_string(),
        })?;

    let old_score = number.reputation;
    number.reputation = compute_reputation(old_score, outcome, policy);
    if outcome == CallOutcome::SpamDetected {
        number.status = NumberStatus::Spam;
        number.spam_reports += 1;
    }
    store.update_number(&number).await?;

    store
        .insert_reputation_log(&ReputationLog {
            id: new_id(),
            number_id: number.id.clone(),
            old_score,
            new_score: number.reputation,
            reason: format!("call outcome: {outcome}"),
            source: ReputationSource::CallOutcome,
            created_at: now_ts(),
        })
        .await?;

    debug!(
        number_id = %number.id,
        old_score,
        new_score = number.reputation,
        outcome = %outcome,
        "reputation updated"
    );
    Ok(number)
}
