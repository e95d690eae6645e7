//! # Ordered Counter
//!
//! Keeps the count-to-keys partition in a `BTreeMap`, so the extremes are the
//! first and last map entries. Every update is a map removal plus insertion:
//! O(log d) where d is the number of distinct counts.
//!
//! ```text
//!   counts:   FxHashMap<K, u64>          by_count: BTreeMap<u64, FxHashSet<K>>
//!   ┌───────┬───────┐                    ┌───────┬─────────────┐
//!   │  "a"  │   1   │                    │   1   │ {"a"}       │ ◄── min_key()
//!   │  "b"  │   3   │                    │   3   │ {"b", "c"}  │ ◄── max_key()
//!   │  "c"  │   3   │                    └───────┴─────────────┘
//!   └───────┴───────┘
//! ```
//!
//! Empty key sets are removed immediately, so `by_count.len()` is always the
//! number of distinct live counts.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CounterMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CounterMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CounterMetricsReadRecorder, CounterMetricsRecorder, MetricsSnapshotProvider,
};
use crate::traits::CountedKeys;

/// Counter with an ordered count index.
///
/// # Example
///
/// ```
/// use countkit::counter::OrderedCounter;
/// use countkit::traits::CountedKeys;
///
/// let mut counter = OrderedCounter::new();
/// counter.increment("a");
/// counter.increment("b");
/// counter.increment("b");
///
/// assert_eq!(counter.distinct_counts(), 2);
/// assert_eq!(counter.max_key(), Some(&"b"));
/// ```
#[derive(Debug)]
pub struct OrderedCounter<K> {
    counts: FxHashMap<K, u64>,
    by_count: BTreeMap<u64, FxHashSet<K>>,
    #[cfg(feature = "metrics")]
    metrics: CounterMetrics,
}

impl<K> OrderedCounter<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            by_count: BTreeMap::new(),
            #[cfg(feature = "metrics")]
            metrics: CounterMetrics::default(),
        }
    }

    /// Number of distinct live counts.
    pub fn distinct_counts(&self) -> usize {
        self.by_count.len()
    }

    fn detach(&mut self, key: &K, count: u64) {
        if let Some(keys) = self.by_count.get_mut(&count) {
            keys.remove(key);
            if keys.is_empty() {
                self.by_count.remove(&count);
            }
        }
    }

    fn attach(&mut self, key: K, count: u64) {
        self.by_count.entry(count).or_default().insert(key);
    }
}

#[cfg(feature = "metrics")]
impl<K> OrderedCounter<K>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> CounterMetricsSnapshot {
        CounterMetricsSnapshot::capture(&self.metrics, self.counts.len(), self.by_count.len())
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsSnapshotProvider<CounterMetricsSnapshot> for OrderedCounter<K>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CounterMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K> Default for OrderedCounter<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CountedKeys<K> for OrderedCounter<K>
where
    K: Eq + Hash + Clone,
{
    fn increment(&mut self, key: K) -> u64 {
        let next = match self.counts.get(&key).copied() {
            Some(u64::MAX) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_increment_saturated();
                return u64::MAX;
            },
            Some(count) => {
                self.detach(&key, count);
                #[cfg(feature = "metrics")]
                self.metrics.record_increment_existing();
                count + 1
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_increment_new();
                1
            },
        };
        self.attach(key.clone(), next);
        self.counts.insert(key, next);
        next
    }

    fn decrement(&mut self, key: &K) -> Option<u64> {
        let Some(count) = self.counts.get(key).copied() else {
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_missing();
            return None;
        };
        self.detach(key, count);
        let remaining = count - 1;
        if remaining == 0 {
            self.counts.remove(key);
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_removed();
        } else {
            self.attach(key.clone(), remaining);
            self.counts.insert(key.clone(), remaining);
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_existing();
        }
        Some(remaining)
    }

    fn max_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_max_key_call();
        self.by_count.last_key_value()?.1.iter().next()
    }

    fn min_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_min_key_call();
        self.by_count.first_key_value()?.1.iter().next()
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
        self.by_count.clear();
    }

    fn max_count(&self) -> Option<u64> {
        self.by_count.last_key_value().map(|(&count, _)| count)
    }

    fn min_count(&self) -> Option<u64> {
        self.by_count.first_key_value().map(|(&count, _)| count)
    }
}
