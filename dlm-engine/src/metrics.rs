//! Activation metrics
//!
//! Counters for view lookups and activation attempts, readable while other
//! threads keep activating.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ActivationMetrics {
    /// View lookups answered from the cache
    pub hit_count: AtomicU64,

    /// View lookups that found nothing cached
    pub miss_count: AtomicU64,

    /// Activation attempts that published a view
    pub activated_count: AtomicU64,

    /// Activation attempts that failed
    pub failed_count: AtomicU64,

    /// Total time spent in activation attempts (nanoseconds)
    pub total_activation_time_ns: AtomicU64,
}

impl ActivationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one activation attempt and how long it took
    pub fn record_activation(&self, succeeded: bool, duration: Duration) {
        if succeeded {
            self.activated_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_activation_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            activated: self.activated_count.load(Ordering::Relaxed),
            failed: self.failed_count.load(Ordering::Relaxed),
            total_time_ns: self.total_activation_time_ns.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`ActivationMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub activated: u64,
    pub failed: u64,
    pub total_time_ns: u64,
}

impl MetricsSnapshot {
    pub fn attempts(&self) -> u64 {
        self.activated + self.failed
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn avg_activation_time(&self) -> Duration {
        match self.attempts() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(self.total_time_ns / n),
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Activated: {} | Failed: {} | Avg Time: {:.2}ms",
            self.activated,
            self.failed,
            self.avg_activation_time().as_secs_f64() * 1000.0
        )?;
        write!(
            f,
            "View hits: {} | Misses: {} | Hit Rate: {:.1}%",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_counts() {
        let metrics = ActivationMetrics::new();

        metrics.record_activation(true, Duration::from_millis(10));
        metrics.record_activation(false, Duration::from_millis(20));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.activated, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.attempts(), 2);
        assert_eq!(snapshot.avg_activation_time(), Duration::from_millis(15));
    }

    #[test]
    fn test_hit_rate() {
        let metrics = ActivationMetrics::new();
        assert_eq!(metrics.snapshot().hit_rate(), 0.0);

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert_eq!(metrics.snapshot().hit_rate(), 0.75);
    }
}
