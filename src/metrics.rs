//! Query Metrics
//!
//! Per-query-kind counters and latency tracking.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for store queries
#[derive(Debug)]
pub struct QueryMetrics {
    /// Total queries
    total_queries: AtomicU64,

    /// Queries per kind (nearest, analogy, ...)
    by_kind: RwLock<HashMap<String, u64>>,

    /// Queries that found nothing (unknown words)
    misses: AtomicU64,

    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            by_kind: RwLock::new(HashMap::new()),
            misses: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record a query
    ///
    /// `hit` is false when the query named an unknown word.
    pub fn record(&self, kind: &str, latency: Duration, hit: bool) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        *self.by_kind.write().entry(kind.to_string()).or_insert(0) += 1;

        let latency_us = latency.as_micros() as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Snapshot of per-kind counts
    pub fn by_kind(&self) -> HashMap<String, u64> {
        self.by_kind.read().clone()
    }

    /// Average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    pub fn min_latency_us(&self) -> u64 {
        let min = self.latency_min_us.load(Ordering::Relaxed);
        if min == u64::MAX {
            0
        } else {
            min
        }
    }

    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Queries: {} (misses: {}) | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_queries(),
            self.misses(),
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = QueryMetrics::new();

        metrics.record("nearest", Duration::from_micros(100), true);
        metrics.record("nearest", Duration::from_micros(200), false);
        metrics.record("analogy", Duration::from_micros(150), true);

        assert_eq!(metrics.total_queries(), 3);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.min_latency_us(), 100);
        assert_eq!(metrics.max_latency_us(), 200);
        assert!((metrics.avg_latency_us() - 150.0).abs() < 0.1);

        let by_kind = metrics.by_kind();
        assert_eq!(by_kind.get("nearest"), Some(&2));
        assert_eq!(by_kind.get("analogy"), Some(&1));
    }

    #[test]
    fn test_empty_summary() {
        let metrics = QueryMetrics::default();
        assert_eq!(metrics.min_latency_us(), 0);
        assert!(metrics.summary().starts_with("Queries: 0 (misses: 0)"));
    }
}
