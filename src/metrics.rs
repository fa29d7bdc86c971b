//! Lightweight operation counters, enabled with the `metrics` feature.
//!
//! Counters are relaxed atomics updated on the operation paths; a snapshot
//! is a plain copy with no synchronization between fields, so totals taken
//! under concurrent load are approximate by one in-flight operation at most
//! per counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal counter block, one per cache.
#[derive(Debug, Default)]
pub(crate) struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removals: AtomicU64,
    evictions: AtomicU64,
    drains: AtomicU64,
    dropped_accesses: AtomicU64,
}

impl CacheMetrics {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drain(&self) {
        self.drains.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_access(&self) {
        self.dropped_accesses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
            dropped_accesses: self.dropped_accesses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a cache's counters.
///
/// Returned by `Cache::metrics_snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lookups that found a live entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Inserts of a previously absent key.
    pub inserts: u64,
    /// Inserts that replaced an existing value.
    pub updates: u64,
    /// Explicit removals of a present key.
    pub removals: u64,
    /// Entries evicted to enforce the capacity bound.
    pub evictions: u64,
    /// Completed drain passes.
    pub drains: u64,
    /// Access events discarded because a buffer was full.
    pub dropped_accesses: u64,
}

impl MetricsSnapshot {
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = CacheMetrics::default();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        metrics.record_insert();
        metrics.record_eviction();

        let snap = metrics.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.inserts, 1);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.updates, 0);
    }

    #[test]
    fn hit_rate_handles_the_empty_case() {
        let metrics = CacheMetrics::default();
        assert_eq!(metrics.snapshot().hit_rate(), 0.0);

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        assert!((metrics.snapshot().hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn cache_counters_flow_end_to_end() {
        use crate::builder::CacheBuilder;

        let cache = CacheBuilder::new().maximum_capacity(2).build::<u64, u64>();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(1, 11);
        cache.get(&1);
        cache.get(&99);
        cache.put(3, 30);
        cache.drain_buffers();
        cache.remove(&3);

        let snap = cache.metrics_snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.inserts, 3);
        assert_eq!(snap.updates, 1);
        assert_eq!(snap.removals, 1);
        assert_eq!(snap.evictions, 1);
        assert!(snap.drains > 0);
    }
}
