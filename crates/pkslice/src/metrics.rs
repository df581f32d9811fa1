//! Counters for slicing runs.
//!
//! The caller owns a [`SliceMetrics`] and passes it into each run; counters are
//! atomics so one instance can be shared across concurrent runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Aggregated counters across slicing runs.
#[derive(Debug, Default)]
pub struct SliceMetrics {
    /// Number of completed runs (including empty-table runs).
    runs: AtomicU64,
    /// Number of primary-key catalog lookups.
    catalog_queries: AtomicU64,
    /// Sum of catalog lookup latency in nanoseconds.
    catalog_latency_ns_total: AtomicU64,
    /// Number of `COUNT(*)` queries issued.
    count_queries: AtomicU64,
    /// Total rows reported by count queries.
    rows_counted: AtomicU64,
    /// Number of runs that found an empty table.
    empty_tables: AtomicU64,
    /// Number of rank-sample queries issued.
    sample_queries: AtomicU64,
    /// Rows returned by rank-sample queries.
    rows_sampled: AtomicU64,
    /// Boundaries kept after deduplication.
    boundaries: AtomicU64,
    /// Sum of count plus sample latency in nanoseconds.
    sample_latency_ns_total: AtomicU64,
    /// Predicates (and thus statements) emitted.
    predicates: AtomicU64,
}

/// Immutable snapshot view of [`SliceMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceMetricsSnapshot {
    pub runs: u64,
    pub catalog_queries: u64,
    pub catalog_latency_ns_total: u64,
    pub count_queries: u64,
    pub rows_counted: u64,
    pub empty_tables: u64,
    pub sample_queries: u64,
    pub rows_sampled: u64,
    pub boundaries: u64,
    pub sample_latency_ns_total: u64,
    pub predicates: u64,
}

impl SliceMetrics {
    pub fn record_catalog_lookup(&self, latency: Duration) {
        self.catalog_queries.fetch_add(1, Ordering::Relaxed);
        self.catalog_latency_ns_total
            .fetch_add(duration_to_ns(latency), Ordering::Relaxed);
    }

    pub fn record_count(&self, rows: u64) {
        self.count_queries.fetch_add(1, Ordering::Relaxed);
        self.rows_counted.fetch_add(rows, Ordering::Relaxed);
        if rows == 0 {
            self.empty_tables.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_sample(&self, rows_returned: u64, boundaries_kept: u64) {
        self.sample_queries.fetch_add(1, Ordering::Relaxed);
        self.rows_sampled.fetch_add(rows_returned, Ordering::Relaxed);
        self.boundaries.fetch_add(boundaries_kept, Ordering::Relaxed);
    }

    pub fn record_sampling_latency(&self, latency: Duration) {
        self.sample_latency_ns_total
            .fetch_add(duration_to_ns(latency), Ordering::Relaxed);
    }

    pub fn record_run(&self, predicates: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.predicates.fetch_add(predicates, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SliceMetricsSnapshot {
        SliceMetricsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            catalog_queries: self.catalog_queries.load(Ordering::Relaxed),
            catalog_latency_ns_total: self.catalog_latency_ns_total.load(Ordering::Relaxed),
            count_queries: self.count_queries.load(Ordering::Relaxed),
            rows_counted: self.rows_counted.load(Ordering::Relaxed),
            empty_tables: self.empty_tables.load(Ordering::Relaxed),
            sample_queries: self.sample_queries.load(Ordering::Relaxed),
            rows_sampled: self.rows_sampled.load(Ordering::Relaxed),
            boundaries: self.boundaries.load(Ordering::Relaxed),
            sample_latency_ns_total: self.sample_latency_ns_total.load(Ordering::Relaxed),
            predicates: self.predicates.load(Ordering::Relaxed),
        }
    }
}

fn duration_to_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
