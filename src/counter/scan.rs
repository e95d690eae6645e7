//! # Scanning Counter
//!
//! The simplest store that honours [`CountedKeys`]: one hash map from key to
//! count. Updates are O(1); `max_key`/`min_key` walk every live key.
//!
//! ```text
//!   counts: FxHashMap<K, u64>
//!   ┌───────┬───────┐
//!   │  "a"  │   1   │ ◄─┐
//!   │  "b"  │   2   │ ◄─┼── max_key()/min_key() visit every row
//!   │  "c"  │   3   │ ◄─┘
//!   └───────┴───────┘
//! ```
//!
//! Useful as a behavioural reference in tests and as the baseline the bucket
//! list is benchmarked against. With the `metrics` feature every visited key
//! bumps `scan_steps`.
//!
//! ## Example
//!
//! ```
//! use countkit::counter::ScanCounter;
//! use countkit::traits::CountedKeys;
//!
//! let mut counter = ScanCounter::new();
//! counter.increment("a");
//! counter.increment("b");
//! counter.increment("b");
//!
//! assert_eq!(counter.max_key(), Some(&"b"));
//! assert_eq!(counter.min_key(), Some(&"a"));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CounterMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CounterMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CounterMetricsReadRecorder, CounterMetricsRecorder, MetricsSnapshotProvider,
};
use crate::traits::CountedKeys;

/// Hash-map counter with linear-scan extremal queries.
#[derive(Debug)]
pub struct ScanCounter<K> {
    counts: FxHashMap<K, u64>,
    #[cfg(feature = "metrics")]
    metrics: CounterMetrics,
}

impl<K> ScanCounter<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            #[cfg(feature = "metrics")]
            metrics: CounterMetrics::default(),
        }
    }

    /// Returns the first key the scan meets whose count beats every earlier
    /// one under `better`.
    fn scan(&self, better: impl Fn(u64, u64) -> bool) -> Option<&K> {
        let mut best: Option<(&K, u64)> = None;
        for (key, &count) in &self.counts {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_scan_step();
            if best.is_none_or(|(_, best_count)| better(count, best_count)) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| key)
    }
}

#[cfg(feature = "metrics")]
impl<K> ScanCounter<K>
where
    K: Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> CounterMetricsSnapshot {
        let distinct: rustc_hash::FxHashSet<u64> = self.counts.values().copied().collect();
        CounterMetricsSnapshot::capture(&self.metrics, self.counts.len(), distinct.len())
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsSnapshotProvider<CounterMetricsSnapshot> for ScanCounter<K>
where
    K: Eq + Hash,
{
    fn snapshot(&self) -> CounterMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K> Default for ScanCounter<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CountedKeys<K> for ScanCounter<K>
where
    K: Eq + Hash,
{
    fn increment(&mut self, key: K) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        #[cfg(feature = "metrics")]
        match *count {
            0 => self.metrics.record_increment_new(),
            u64::MAX => self.metrics.record_increment_saturated(),
            _ => self.metrics.record_increment_existing(),
        }
        *count = count.saturating_add(1);
        *count
    }

    fn decrement(&mut self, key: &K) -> Option<u64> {
        let Some(count) = self.counts.get_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_missing();
            return None;
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(key);
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_removed();
        } else {
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_existing();
        }
        Some(remaining)
    }

    fn max_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_max_key_call();
        self.scan(|count, best| count > best)
    }

    fn min_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_min_key_call();
        self.scan(|count, best| count < best)
    }

    fn count(&self, key: &K) -> Option<u64> {
        self.counts.get(key).copied()
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.counts.clear();
    }

    fn max_count(&self) -> Option<u64> {
        self.counts.values().copied().max()
    }

    fn min_count(&self) -> Option<u64> {
        self.counts.values().copied().min()
    }
}
