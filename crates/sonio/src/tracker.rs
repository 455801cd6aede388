//! # Strategy Performance Tracking
//!
//! Rolling success/failure/latency counters per acquisition strategy,
//! used to reorder strategy attempts so the method that has been working
//! (and working fast) is tried first. State is process-wide and in-memory;
//! counters reset on restart.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// How many net failures (failures minus successes) a strategy may
/// accumulate before it is demoted below every non-failing strategy.
const DEMOTION_NET_FAILURES: u64 = 2;

/// Rolling statistics for one named strategy
#[derive(Debug, Clone, Default)]
pub struct StrategyStats {
    /// Number of successful attempts
    pub successes: u64,
    /// Number of failed attempts
    pub failures: u64,
    /// Smoothed latency of successful attempts in milliseconds
    pub avg_latency_ms: u64,
}

impl StrategyStats {
    /// Success rate over all recorded attempts, or `prior` with no data
    fn success_rate(&self, prior: f64) -> f64 {
        let total = self.successes + self.failures;
        if total == 0 {
            prior
        } else {
            self.successes as f64 / total as f64
        }
    }

    /// Inverse-latency speed signal; 0 until a success has been recorded
    fn normalized_speed(&self) -> f64 {
        if self.avg_latency_ms == 0 {
            0.0
        } else {
            10_000.0 / self.avg_latency_ms as f64
        }
    }

    /// Whether this strategy has been failing badly enough to be demoted
    /// below strategies that have not
    fn is_degraded(&self) -> bool {
        self.failures > self.successes + DEMOTION_NET_FAILURES
    }

    /// Combined ordering score: mostly reliability, partly speed
    fn score(&self, prior: f64) -> f64 {
        0.7 * self.success_rate(prior) + 0.3 * self.normalized_speed()
    }
}

/// Shared tracker of per-strategy health, safe for concurrent updates
/// from every in-flight acquisition
#[derive(Debug, Default)]
pub struct StrategyPerformanceTracker {
    stats: RwLock<HashMap<&'static str, StrategyStats>>,
}

impl StrategyPerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful attempt and fold its latency into the average
    pub fn record_success(&self, strategy: &'static str, latency: Duration) {
        let mut stats = self.stats.write();
        let entry = stats.entry(strategy).or_default();

        entry.successes += 1;

        // Update response time with weighted average
        let latency_ms = latency.as_millis() as u64;
        if entry.avg_latency_ms == 0 {
            entry.avg_latency_ms = latency_ms;
        } else {
            // 70% old value, 30% new value for smoothing
            entry.avg_latency_ms = (entry.avg_latency_ms * 7 + latency_ms * 3) / 10;
        }

        debug!(
            strategy = strategy,
            successes = entry.successes,
            latency_ms = latency_ms,
            avg_latency_ms = entry.avg_latency_ms,
            "Strategy succeeded"
        );
    }

    /// Record a failed attempt
    pub fn record_failure(&self, strategy: &'static str) {
        let mut stats = self.stats.write();
        let entry = stats.entry(strategy).or_default();
        entry.failures += 1;

        debug!(
            strategy = strategy,
            failures = entry.failures,
            "Strategy failed"
        );
    }

    /// Get a copy of the stats recorded for a strategy, if any
    pub fn snapshot(&self, strategy: &str) -> Option<StrategyStats> {
        self.stats.read().get(strategy).cloned()
    }

    /// Compute the attempt order for the given strategies, as indices into
    /// the input slice.
    ///
    /// Strategies sort descending by score, except that a strategy whose
    /// failures outnumber its successes by more than the demotion threshold
    /// sorts below every strategy not in that state. Ties keep declaration
    /// order.
    pub fn ordered(&self, strategies: &[(&'static str, f64)]) -> Vec<usize> {
        let stats = self.stats.read();

        let mut ranked: Vec<(usize, bool, f64)> = strategies
            .iter()
            .enumerate()
            .map(|(index, (name, prior))| {
                let default = StrategyStats::default();
                let entry = stats.get(name).unwrap_or(&default);
                (index, entry.is_degraded(), entry.score(*prior))
            })
            .collect();

        // Degraded strategies last, then by score; sort_by is stable so
        // equal entries keep declaration order
        ranked.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
        });

        ranked.into_iter().map(|(index, _, _)| index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: (&str, f64) = ("alpha", 0.7);
    const B: (&str, f64) = ("beta", 0.5);
    const C: (&str, f64) = ("gamma", 0.3);

    #[test]
    fn priors_decide_order_with_no_data() {
        let tracker = StrategyPerformanceTracker::new();
        assert_eq!(tracker.ordered(&[A, B, C]), vec![0, 1, 2]);
        // Same priors tie-break by declaration order
        assert_eq!(tracker.ordered(&[B, ("other", 0.5)]), vec![0, 1]);
    }

    #[test]
    fn successful_strategy_moves_to_front() {
        let tracker = StrategyPerformanceTracker::new();
        tracker.record_success("gamma", Duration::from_millis(800));

        // gamma: rate 1.0, speed 12.5 -> far ahead of alpha's prior score
        assert_eq!(tracker.ordered(&[A, B, C]), vec![2, 0, 1]);
    }

    #[test]
    fn latency_average_is_smoothed() {
        let tracker = StrategyPerformanceTracker::new();
        tracker.record_success("alpha", Duration::from_millis(1000));
        tracker.record_success("alpha", Duration::from_millis(2000));

        let stats = tracker.snapshot("alpha").unwrap();
        // (1000 * 7 + 2000 * 3) / 10
        assert_eq!(stats.avg_latency_ms, 1300);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn counters_only_grow() {
        let tracker = StrategyPerformanceTracker::new();
        tracker.record_failure("alpha");
        tracker.record_success("alpha", Duration::from_millis(100));
        tracker.record_failure("alpha");

        let stats = tracker.snapshot("alpha").unwrap();
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 2);
    }

    #[test]
    fn failing_strategy_is_demoted_below_untouched_ones() {
        let tracker = StrategyPerformanceTracker::new();

        // alpha has a strong prior and a fast success history, but then
        // fails repeatedly: once net failures pass the threshold it must
        // sort below beta even though its raw score is higher
        tracker.record_success("alpha", Duration::from_millis(50));
        for _ in 0..5 {
            tracker.record_failure("alpha");
        }

        let stats = tracker.snapshot("alpha").unwrap();
        assert!(stats.is_degraded());
        assert_eq!(tracker.ordered(&[A, B]), vec![1, 0]);
    }

    #[test]
    fn demotion_requires_more_than_threshold() {
        let tracker = StrategyPerformanceTracker::new();
        tracker.record_failure("alpha");
        tracker.record_failure("alpha");

        // Two net failures is at the threshold, not past it
        let stats = tracker.snapshot("alpha").unwrap();
        assert!(!stats.is_degraded());

        tracker.record_failure("alpha");
        let stats = tracker.snapshot("alpha").unwrap();
        assert!(stats.is_degraded());
    }

    #[test]
    fn two_degraded_strategies_still_rank_by_score() {
        let tracker = StrategyPerformanceTracker::new();
        for _ in 0..4 {
            tracker.record_failure("alpha");
            tracker.record_failure("beta");
        }
        tracker.record_success("beta", Duration::from_millis(100));
        for _ in 0..2 {
            tracker.record_failure("beta");
        }

        // Both demoted; beta has a success so its score is higher
        assert_eq!(tracker.ordered(&[A, B]), vec![1, 0]);
    }
}
