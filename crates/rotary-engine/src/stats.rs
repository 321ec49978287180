// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call statistics aggregation.
//!
//! Pure functions over rows the caller has already fetched; nothing here
//! touches the store. Every rate guards its denominator, so empty inputs
//! yield zeros rather than NaN.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use rotary_core::types::{Call, CallAttempt, CallOutcome, Lead, TestGroup, format_ts};

/// Summary counts and rates over a set of calls or call attempts.
///
/// Lead-related fields are zero when the input has no lead dimension
/// (owner-level call summaries).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_leads: u64,
    /// Leads with at least one attempt.
    pub leads_contacted: u64,
    pub total_calls: u64,
    pub answered_calls: u64,
    /// answered / total, in percent.
    pub answer_rate: f64,
    /// converted / contacted, in percent.
    pub conversion_rate: f64,
    /// Mean duration over answered calls only.
    pub avg_duration_secs: f64,
    /// Mean provider spam score over spam-checked attempts only.
    pub avg_spam_score: f64,
    /// blocked / total, in percent.
    pub spam_block_rate: f64,
}

/// Reporting window for owner-level call summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    Week,
    Month,
}

impl Timeframe {
    /// Inclusive lower bound of the window, as a sortable timestamp.
    pub fn since(self) -> String {
        let now = Utc::now();
        let start = match self {
            // Midnight UTC of the current day.
            Timeframe::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc(),
            Timeframe::Week => now - Duration::days(7),
            Timeframe::Month => now - Duration::days(30),
        };
        format_ts(start)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round2(numerator as f64 / denominator as f64 * 100.0)
    }
}

fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { round2(sum / count as f64) }
}

/// Aggregate A/B test metrics over leads and their call attempts.
///
/// When `group` is set, only leads in that group (and their attempts)
/// contribute; attempts whose lead falls outside the filter are ignored.
pub fn aggregate(leads: &[Lead], attempts: &[CallAttempt], group: Option<TestGroup>) -> Metrics {
    let leads: Vec<&Lead> = leads
        .iter()
        .filter(|l| group.is_none_or(|g| l.group == g))
        .collect();
    let lead_ids: HashSet<&str> = leads.iter().map(|l| l.id.as_str()).collect();
    let attempts: Vec<&CallAttempt> = attempts
        .iter()
        .filter(|a| lead_ids.contains(a.lead_id.as_str()))
        .collect();

    let contacted_ids: HashSet<&str> = attempts.iter().map(|a| a.lead_id.as_str()).collect();
    let total_calls = attempts.len() as u64;
    let answered: Vec<&&CallAttempt> = attempts.iter().filter(|a| a.answered).collect();
    let answered_calls = answered.len() as u64;
    let blocked = attempts.iter().filter(|a| a.blocked).count() as u64;
    let converted = leads.iter().filter(|l| l.converted).count() as u64;

    let duration_sum: f64 = answered.iter().map(|a| a.duration_secs).sum();
    let checked: Vec<f64> = attempts
        .iter()
        .filter(|a| a.spam_checked)
        .filter_map(|a| a.spam_score)
        .collect();
    let spam_sum: f64 = checked.iter().sum();

    Metrics {
        total_leads: leads.len() as u64,
        leads_contacted: contacted_ids.len() as u64,
        total_calls,
        answered_calls,
        answer_rate: pct(answered_calls, total_calls),
        conversion_rate: pct(converted, contacted_ids.len() as u64),
        avg_duration_secs: mean(duration_sum, answered_calls),
        avg_spam_score: mean(spam_sum, checked.len() as u64),
        spam_block_rate: pct(blocked, total_calls),
    }
}

/// Summarize an owner's logged calls over a timeframe the caller already
/// applied. `success` counts as answered; `spam_detected` counts as blocked.
pub fn call_summary(calls: &[Call]) -> Metrics {
    let total_calls = calls.len() as u64;
    let answered: Vec<&Call> = calls
        .iter()
        .filter(|c| c.outcome == CallOutcome::Success)
        .collect();
    let answered_calls = answered.len() as u64;
    let blocked = calls
        .iter()
        .filter(|c| c.outcome == CallOutcome::SpamDetected)
        .count() as u64;
    let duration_sum: f64 = answered.iter().map(|c| c.duration_secs).sum();

    Metrics {
        total_calls,
        answered_calls,
        answer_rate: pct(answered_calls, total_calls),
        avg_duration_secs: mean(duration_sum, answered_calls),
        spam_block_rate: pct(blocked, total_calls),
        ..Metrics::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotary_core::types::{new_id, now_ts};
    use rotary_test_utils::fixtures;

    fn lead(id: &str, group: TestGroup, converted: bool) -> Lead {
        Lead {
            id: id.into(),
            test_id: "t1".into(),
            group,
            converted,
            owner_id: "u1".into(),
            created_at: now_ts(),
        }
    }

    fn attempt(lead_id: &str, answered: bool, duration: f64) -> CallAttempt {
        CallAttempt {
            id: new_id(),
            lead_id: lead_id.into(),
            answered,
            duration_secs: duration,
            spam_checked: false,
            spam_score: None,
            blocked: false,
            created_at: now_ts(),
        }
    }

    #[test]
    fn empty_inputs_yield_all_zeros() {
        let metrics = aggregate(&[], &[], None);
        assert_eq!(metrics, Metrics::default());
        assert_eq!(call_summary(&[]), Metrics::default());
    }

    #[test]
    fn rates_and_means_over_mixed_attempts() {
        let leads = vec![
            lead("l1", TestGroup::A, true),
            lead("l2", TestGroup::A, false),
            lead("l3", TestGroup::A, false),
        ];
        let mut checked = attempt("l1", true, 30.0);
        checked.spam_checked = true;
        checked.spam_score = Some(20.0);
        let mut blocked = attempt("l2", false, 0.0);
        blocked.blocked = true;
        let attempts = vec![
            checked,
            attempt("l1", true, 10.0),
            blocked,
            attempt("l2", false, 0.0),
        ];

        let metrics = aggregate(&leads, &attempts, None);
        assert_eq!(metrics.total_leads, 3);
        // l3 was never attempted.
        assert_eq!(metrics.leads_contacted, 2);
        assert_eq!(metrics.total_calls, 4);
        assert_eq!(metrics.answered_calls, 2);
        assert_eq!(metrics.answer_rate, 50.0);
        // 1 converted of 2 contacted.
        assert_eq!(metrics.conversion_rate, 50.0);
        // Mean over answered only: (30 + 10) / 2.
        assert_eq!(metrics.avg_duration_secs, 20.0);
        // Mean over spam-checked only.
        assert_eq!(metrics.avg_spam_score, 20.0);
        assert_eq!(metrics.spam_block_rate, 25.0);
    }

    #[test]
    fn group_filter_excludes_other_groups_attempts() {
        let leads = vec![
            lead("a1", TestGroup::A, true),
            lead("b1", TestGroup::B, false),
        ];
        let attempts = vec![attempt("a1", true, 12.0), attempt("b1", false, 0.0)];

        let a = aggregate(&leads, &attempts, Some(TestGroup::A));
        assert_eq!(a.total_leads, 1);
        assert_eq!(a.total_calls, 1);
        assert_eq!(a.answer_rate, 100.0);
        assert_eq!(a.conversion_rate, 100.0);

        let b = aggregate(&leads, &attempts, Some(TestGroup::B));
        assert_eq!(b.total_calls, 1);
        assert_eq!(b.answer_rate, 0.0);
        assert_eq!(b.conversion_rate, 0.0);
    }

    #[test]
    fn rates_round_to_two_decimals() {
        let leads = vec![
            lead("l1", TestGroup::A, true),
            lead("l2", TestGroup::A, false),
            lead("l3", TestGroup::A, false),
        ];
        let attempts = vec![
            attempt("l1", true, 10.0),
            attempt("l2", false, 0.0),
            attempt("l3", false, 0.0),
        ];
        let metrics = aggregate(&leads, &attempts, None);
        // 1/3 of attempts answered, 1/3 of contacted converted.
        assert_eq!(metrics.answer_rate, 33.33);
        assert_eq!(metrics.conversion_rate, 33.33);
    }

    #[test]
    fn call_summary_counts_success_and_spam() {
        let mut answered = fixtures::call("u1", "n1", "c1", "2026-01-01T10:00:00.000Z");
        answered.duration_secs = 42.0;
        let mut busy = fixtures::call("u1", "n1", "c1", "2026-01-01T11:00:00.000Z");
        busy.outcome = CallOutcome::Busy;
        let mut spam = fixtures::call("u1", "n1", "c1", "2026-01-01T12:00:00.000Z");
        spam.outcome = CallOutcome::SpamDetected;

        let metrics = call_summary(&[answered, busy, spam]);
        assert_eq!(metrics.total_calls, 3);
        assert_eq!(metrics.answered_calls, 1);
        assert_eq!(metrics.answer_rate, 33.33);
        assert_eq!(metrics.avg_duration_secs, 42.0);
        assert_eq!(metrics.spam_block_rate, 33.33);
        assert_eq!(metrics.total_leads, 0);
    }

    #[test]
    fn timeframe_bounds_are_ordered() {
        let today = Timeframe::Today.since();
        let week = Timeframe::Week.since();
        let month = Timeframe::Month.since();
        // Sortable timestamps: wider windows start earlier.
        assert!(month < week);
        assert!(week <= today);
    }
}
