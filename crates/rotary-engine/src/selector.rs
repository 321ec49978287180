// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Next-number selection over a cadence's eligible pool.
//!
//! `round_robin` is fully deterministic given the call history. `random`
//! and the `reputation_based` tie-break are the only non-deterministic
//! paths, and both draw from an injected `Rng` so tests can seed them.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use rotary_core::error::{Result, RotaryError};
use rotary_core::types::{PhoneNumber, RotationStrategy};

/// Resolve a cadence's raw strategy string.
///
/// An unrecognized strategy is a configuration error to surface, not to
/// silently coerce. `legacy_fallback` restores the old coerce-to-round_robin
/// behavior for deployments that depend on it.
pub fn resolve_strategy(raw: &str, legacy_fallback: bool) -> Result<RotationStrategy> {
    match raw.parse::<RotationStrategy>() {
        Ok(strategy) => Ok(strategy),
        Err(_) if legacy_fallback => {
            warn!(strategy = raw, "unrecognized rotation strategy, legacy fallback to round_robin");
            Ok(RotationStrategy::RoundRobin)
        }
        Err(_) => Err(RotaryError::InvalidStrategy(raw.to_string())),
    }
}

/// Pick the next number from `pool` under the given strategy.
///
/// `pool` is the cadence's eligible numbers in pool order; `last_used` is
/// the number id of the most recent call logged against the cadence, if
/// any. Returns `None` for an empty pool rather than panicking.
pub fn select_next<'a, R: Rng + ?Sized>(
    strategy: RotationStrategy,
    pool: &'a [PhoneNumber],
    last_used: Option<&str>,
    rng: &mut R,
) -> Option<&'a PhoneNumber> {
    if pool.is_empty() {
        return None;
    }
    match strategy {
        RotationStrategy::Random => pool.choose(rng),
        RotationStrategy::ReputationBased => {
            let best = pool
                .iter()
                .map(|n| n.reputation)
                .fold(f64::MIN, f64::max);
            // Uniform draw among the tied set, not first-in-list, to avoid
            // starvation bias.
            let tied: Vec<&PhoneNumber> =
                pool.iter().filter(|n| n.reputation == best).collect();
            tied.choose(rng).copied()
        }
        RotationStrategy::RoundRobin => {
            let position = last_used.and_then(|id| pool.iter().position(|n| n.id == id));
            match position {
                Some(i) => pool.get((i + 1) % pool.len()),
                // No prior call, or the previous number left the pool.
                None => pool.first(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rotary_core::types::NumberStatus;
    use rotary_test_utils::fixtures;

    fn pool_of(reputations: &[f64]) -> Vec<PhoneNumber> {
        reputations
            .iter()
            .enumerate()
            .map(|(i, &rep)| {
                let mut n = fixtures::phone_number("u1", NumberStatus::Active, rep);
                n.id = format!("n-{}", i + 1);
                n
            })
            .collect()
    }

    #[test]
    fn empty_pool_returns_none_for_every_strategy() {
        let mut rng = StdRng::seed_from_u64(1);
        for strategy in [
            RotationStrategy::RoundRobin,
            RotationStrategy::Random,
            RotationStrategy::ReputationBased,
        ] {
            assert!(select_next(strategy, &[], None, &mut rng).is_none());
        }
    }

    #[test]
    fn round_robin_advances_cyclically() {
        let pool = pool_of(&[50.0, 50.0, 50.0]);
        let mut rng = StdRng::seed_from_u64(1);

        // Most recent call used n-2: next is n-3.
        let next = select_next(RotationStrategy::RoundRobin, &pool, Some("n-2"), &mut rng);
        assert_eq!(next.unwrap().id, "n-3");

        // Last in pool wraps to first.
        let next = select_next(RotationStrategy::RoundRobin, &pool, Some("n-3"), &mut rng);
        assert_eq!(next.unwrap().id, "n-1");

        // No prior call: first in pool order.
        let next = select_next(RotationStrategy::RoundRobin, &pool, None, &mut rng);
        assert_eq!(next.unwrap().id, "n-1");

        // Previously used number no longer in the pool: first in pool order.
        let next = select_next(RotationStrategy::RoundRobin, &pool, Some("gone"), &mut rng);
        assert_eq!(next.unwrap().id, "n-1");
    }

    #[test]
    fn round_robin_is_deterministic_given_identical_history() {
        let pool = pool_of(&[10.0, 20.0, 30.0]);
        for _ in 0..50 {
            let mut rng = StdRng::seed_from_u64(rand::random());
            let next = select_next(RotationStrategy::RoundRobin, &pool, Some("n-1"), &mut rng);
            assert_eq!(next.unwrap().id, "n-2");
        }
    }

    #[test]
    fn reputation_based_picks_the_maximum() {
        let pool = pool_of(&[40.0, 90.0, 70.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let next = select_next(RotationStrategy::ReputationBased, &pool, None, &mut rng);
        assert_eq!(next.unwrap().id, "n-2");
    }

    #[test]
    fn reputation_tie_break_is_roughly_uniform() {
        let pool = pool_of(&[80.0, 80.0, 20.0]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut picks = [0usize; 2];
        for _ in 0..2000 {
            let next = select_next(RotationStrategy::ReputationBased, &pool, None, &mut rng)
                .unwrap();
            match next.id.as_str() {
                "n-1" => picks[0] += 1,
                "n-2" => picks[1] += 1,
                other => panic!("low-reputation number selected: {other}"),
            }
        }
        // Statistical bound, not exact equality: each side of a fair coin
        // over 2000 trials stays within [850, 1150] overwhelmingly often.
        assert!((850..=1150).contains(&picks[0]), "skewed: {picks:?}");
        assert!((850..=1150).contains(&picks[1]), "skewed: {picks:?}");
    }

    #[test]
    fn random_draws_cover_the_pool() {
        let pool = pool_of(&[10.0, 20.0, 30.0]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let next = select_next(RotationStrategy::Random, &pool, None, &mut rng).unwrap();
            seen.insert(next.id.clone());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn strategy_resolution_surfaces_invalid_unless_legacy() {
        assert_eq!(
            resolve_strategy("reputation_based", false).unwrap(),
            RotationStrategy::ReputationBased
        );

        let err = resolve_strategy("fastest", false).unwrap_err();
        assert!(matches!(err, RotaryError::InvalidStrategy(_)));

        assert_eq!(
            resolve_strategy("fastest", true).unwrap(),
            RotationStrategy::RoundRobin
        );
    }
}
