// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SPAM-validation provider for deterministic testing.
//!
//! `MockValidator` implements `SpamValidator` with pre-configured verdicts,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rotary_core::error::{Result, RotaryError};
use rotary_core::traits::SpamValidator;
use rotary_core::types::SpamVerdict;

/// A mock provider that returns pre-configured verdicts.
///
/// Verdicts are popped from a FIFO queue. When the queue is empty, a clean
/// default verdict (not spam, reputation 100) is returned. A provider can
/// also be configured to always fail, for degraded-provider tests.
pub struct MockValidator {
    name: String,
    verdicts: Arc<Mutex<VecDeque<SpamVerdict>>>,
    always_fail: bool,
}

impl MockValidator {
    /// Create a mock provider with an empty verdict queue.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            verdicts: Arc::new(Mutex::new(VecDeque::new())),
            always_fail: false,
        }
    }

    /// Create a mock provider pre-loaded with the given verdicts.
    pub fn with_verdicts(name: &str, verdicts: Vec<SpamVerdict>) -> Self {
        Self {
            name: name.to_string(),
            verdicts: Arc::new(Mutex::new(VecDeque::from(verdicts))),
            always_fail: false,
        }
    }

    /// Create a mock provider whose every call fails.
    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            verdicts: Arc::new(Mutex::new(VecDeque::new())),
            always_fail: true,
        }
    }

    /// Add a verdict to the end of the queue.
    pub async fn add_verdict(&self, verdict: SpamVerdict) {
        self.verdicts.lock().await.push_back(verdict);
    }
}

/// A clean verdict with the given reputation, for fixture brevity.
pub fn clean_verdict(reputation: f64) -> SpamVerdict {
    SpamVerdict {
        is_spam: false,
        reputation,
        reports: 0,
        reason: "clean".into(),
        enrichment: None,
    }
}

/// A spam verdict with the given reputation and report count.
pub fn spam_verdict(reputation: f64, reports: u32) -> SpamVerdict {
    SpamVerdict {
        is_spam: true,
        reputation,
        reports,
        reason: "reported as spam".into(),
        enrichment: None,
    }
}

#[async_trait]
impl SpamValidator for MockValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, _number: &str) -> Result<SpamVerdict> {
        if self.always_fail {
            return Err(RotaryError::Provider {
                message: format!("{} unavailable", self.name),
                source: None,
            });
        }
        Ok(self
            .verdicts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| clean_verdict(100.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verdicts_pop_in_fifo_order_then_default() {
        let validator =
            MockValidator::with_verdicts("truecaller", vec![spam_verdict(10.0, 5), clean_verdict(80.0)]);

        let first = validator.validate("+15550001111").await.unwrap();
        assert!(first.is_spam);
        let second = validator.validate("+15550001111").await.unwrap();
        assert_eq!(second.reputation, 80.0);
        // Queue exhausted: default clean verdict.
        let third = validator.validate("+15550001111").await.unwrap();
        assert!(!third.is_spam);
        assert_eq!(third.reputation, 100.0);
    }

    #[tokio::test]
    async fn failing_provider_returns_provider_error() {
        let validator = MockValidator::failing("hiya");
        let err = validator.validate("+15550001111").await.unwrap_err();
        assert!(matches!(err, RotaryError::Provider { .. }));
    }
}
