// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External SPAM-validation fan-out and verdict combining.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::{SpamValidator, Store};
use rotary_core::types::{
    NumberStatus, PhoneNumber, ReputationLog, ReputationSource, SpamVerdict, clamp_score, new_id,
    now_ts,
};

/// Query every provider and combine their verdicts.
///
/// Providers are queried concurrently. A provider failure is logged and its
/// verdict dropped; only when every provider fails does this return a
/// [`RotaryError::Provider`]. Combination rules: SPAM if any provider says
/// so, reputation is the mean of reported scores, report counts sum, and
/// the first non-empty reason and enrichment win.
pub async fn combined_verdict(
    validators: &[Arc<dyn SpamValidator>],
    number: &str,
) -> Result<SpamVerdict> {
    if validators.is_empty() {
        return Err(RotaryError::Provider {
            message: "no validation providers configured".into(),
            source: None,
        });
    }

    let checks = validators.iter().map(|v| async move {
        let name = v.name();
        (name, v.validate(number).await)
    });
    let results = join_all(checks).await;

    let mut verdicts = Vec::with_capacity(results.len());
    let mut last_error = None;
    for (name, result) in results {
        match result {
            Ok(verdict) => verdicts.push(verdict),
            Err(e) => {
                warn!(provider = name, error = %e, "validation provider failed");
                last_error = Some(e);
            }
        }
    }

    if verdicts.is_empty() {
        return Err(RotaryError::Provider {
            message: "all validation providers failed".into(),
            source: last_error.map(Into::into),
        });
    }

    let reputation =
        verdicts.iter().map(|v| v.reputation).sum::<f64>() / verdicts.len() as f64;
    let reason = verdicts
        .iter()
        .map(|v| v.reason.as_str())
        .find(|r| !r.is_empty())
        .unwrap_or_default()
        .to_string();
    Ok(SpamVerdict {
        is_spam: verdicts.iter().any(|v| v.is_spam),
        reputation: clamp_score(reputation),
        reports: verdicts.iter().map(|v| v.reports).sum(),
        reason,
        enrichment: verdicts.iter().find_map(|v| v.enrichment.clone()),
    })
}

/// Run validation for a number and persist the outcome.
///
/// Overwrites the stored reputation with the combined provider score, flips
/// the status to `spam` on a positive verdict, stamps `last_checked_at`, and
/// appends a reputation-log entry. Provider failure leaves the number
/// untouched.
pub async fn apply_validation(
    store: &dyn Store,
    validators: &[Arc<dyn SpamValidator>],
    owner_id: &str,
    number_id: &str,
) -> Result<SpamVerdict> {
    let mut number: PhoneNumber =
        store
            .get_number(owner_id, number_id)
            .await?
            .ok_or_else(|| RotaryError::NotFound {
                entity: "phone_number",
                id: number_id.to_string(),
            })?;

    let verdict = combined_verdict(validators, &number.number).await?;
    let old_score = number.reputation;

    number.reputation = verdict.reputation;
    number.spam_reports = number.spam_reports.saturating_add(verdict.reports);
    if verdict.is_spam {
        number.status = NumberStatus::Spam;
    }
    number.last_checked_at = Some(now_ts());
    store.update_number(&number).await?;

    store
        .insert_reputation_log(&ReputationLog {
            id: new_id(),
            number_id: number.id.clone(),
            old_score,
            new_score: number.reputation,
            reason: verdict.reason.clone(),
            source: ReputationSource::ApiCheck,
            created_at: now_ts(),
        })
        .await?;

    info!(
        number_id = %number.id,
        is_spam = verdict.is_spam,
        reputation = verdict.reputation,
        "validation applied"
    );
    Ok(verdict)
}
