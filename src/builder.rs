//! Unified builder for all counted-key stores.
//!
//! Picks an implementation at runtime while keeping one concrete type to hold
//! it, so callers can switch strategies from configuration.
//!
//! ## Example
//!
//! ```rust
//! use countkit::builder::{CounterBuilder, CounterKind};
//!
//! let mut counter = CounterBuilder::new(100).build::<String>(CounterKind::Buckets);
//! counter.increment("hello".to_string());
//! counter.increment("hello".to_string());
//! assert_eq!(counter.max_key().map(String::as_str), Some("hello"));
//! assert_eq!(counter.max_count(), Some(2));
//! ```

use std::hash::Hash;

use crate::counter::{OrderedCounter, ScanCounter};
use crate::ds::{CountBuckets, DEFAULT_BUCKET_PREALLOC};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CounterMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::traits::CountedKeys;

/// Available counted-key implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterKind {
    /// Hash map; max/min scan every key.
    Scan,
    /// Hash map plus ordered count index; max/min in O(log d).
    Ordered,
    /// Bucket list; every operation O(1).
    #[default]
    Buckets,
}

impl CounterKind {
    /// All kinds, slowest first.
    pub const ALL: [CounterKind; 3] = [CounterKind::Scan, CounterKind::Ordered, CounterKind::Buckets];
}

/// Counter wrapper that provides one API regardless of implementation.
#[derive(Debug)]
pub struct Counter<K>
where
    K: Eq + Hash + Clone,
{
    inner: CounterInner<K>,
}

#[derive(Debug)]
enum CounterInner<K>
where
    K: Eq + Hash + Clone,
{
    Scan(ScanCounter<K>),
    Ordered(OrderedCounter<K>),
    Buckets(CountBuckets<K>),
}

impl<K> Counter<K>
where
    K: Eq + Hash + Clone,
{
    /// Which implementation backs this counter.
    pub fn kind(&self) -> CounterKind {
        match &self.inner {
            CounterInner::Scan(_) => CounterKind::Scan,
            CounterInner::Ordered(_) => CounterKind::Ordered,
            CounterInner::Buckets(_) => CounterKind::Buckets,
        }
    }

    fn as_dyn(&self) -> &dyn CountedKeys<K> {
        match &self.inner {
            CounterInner::Scan(scan) => scan,
            CounterInner::Ordered(ordered) => ordered,
            CounterInner::Buckets(buckets) => buckets,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn CountedKeys<K> {
        match &mut self.inner {
            CounterInner::Scan(scan) => scan,
            CounterInner::Ordered(ordered) => ordered,
            CounterInner::Buckets(buckets) => buckets,
        }
    }

    /// Adds one to `key`'s count and returns the new count.
    pub fn increment(&mut self, key: K) -> u64 {
        self.as_dyn_mut().increment(key)
    }

    /// Subtracts one from `key`'s count; `None` if absent, `Some(0)` if removed.
    pub fn decrement(&mut self, key: &K) -> Option<u64> {
        self.as_dyn_mut().decrement(key)
    }

    /// A key holding the maximum count.
    pub fn max_key(&self) -> Option<&K> {
        self.as_dyn().max_key()
    }

    /// A key holding the minimum count.
    pub fn min_key(&self) -> Option<&K> {
        self.as_dyn().min_key()
    }

    pub fn max_count(&self) -> Option<u64> {
        self.as_dyn().max_count()
    }

    pub fn min_count(&self) -> Option<u64> {
        self.as_dyn().min_count()
    }

    pub fn count(&self, key: &K) -> Option<u64> {
        self.as_dyn().count(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.as_dyn().contains(key)
    }

    pub fn len(&self) -> usize {
        self.as_dyn().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.as_dyn_mut().clear();
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsSnapshotProvider<CounterMetricsSnapshot> for Counter<K>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CounterMetricsSnapshot {
        match &self.inner {
            CounterInner::Scan(scan) => scan.metrics_snapshot(),
            CounterInner::Ordered(ordered) => ordered.metrics_snapshot(),
            CounterInner::Buckets(buckets) => buckets.metrics_snapshot(),
        }
    }
}

impl<K> CountedKeys<K> for Counter<K>
where
    K: Eq + Hash + Clone,
{
    fn increment(&mut self, key: K) -> u64 {
        Counter::increment(self, key)
    }

    fn decrement(&mut self, key: &K) -> Option<u64> {
        Counter::decrement(self, key)
    }

    fn max_key(&self) -> Option<&K> {
        Counter::max_key(self)
    }

    fn min_key(&self) -> Option<&K> {
        Counter::min_key(self)
    }

    fn count(&self, key: &K) -> Option<u64> {
        Counter::count(self, key)
    }

    fn len(&self) -> usize {
        Counter::len(self)
    }

    fn clear(&mut self) {
        Counter::clear(self)
    }

    fn max_count(&self) -> Option<u64> {
        Counter::max_count(self)
    }

    fn min_count(&self) -> Option<u64> {
        Counter::min_count(self)
    }
}

/// Builder for counter instances.
#[derive(Debug, Clone)]
pub struct CounterBuilder {
    capacity: usize,
    bucket_hint: usize,
}

impl CounterBuilder {
    /// Create a new builder that pre-allocates room for `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bucket_hint: DEFAULT_BUCKET_PREALLOC,
        }
    }

    /// Expected number of distinct counts. Only the bucket list uses it.
    pub fn bucket_hint(mut self, bucket_hint: usize) -> Self {
        self.bucket_hint = bucket_hint;
        self
    }

    /// Build a counter of the given kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use countkit::builder::{CounterBuilder, CounterKind};
    ///
    /// let scan = CounterBuilder::new(16).build::<u64>(CounterKind::Scan);
    /// let buckets = CounterBuilder::new(16)
    ///     .bucket_hint(4)
    ///     .build::<u64>(CounterKind::Buckets);
    ///
    /// assert_eq!(scan.kind(), CounterKind::Scan);
    /// assert_eq!(buckets.kind(), CounterKind::Buckets);
    /// ```
    pub fn build<K>(self, kind: CounterKind) -> Counter<K>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match kind {
            CounterKind::Scan => CounterInner::Scan(ScanCounter::with_capacity(self.capacity)),
            CounterKind::Ordered => {
                CounterInner::Ordered(OrderedCounter::with_capacity(self.capacity))
            },
            CounterKind::Buckets => CounterInner::Buckets(
                CountBuckets::with_capacity_and_bucket_hint(self.capacity, self.bucket_hint),
            ),
        };

        Counter { inner }
    }
}

impl Default for CounterBuilder {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_basic_ops() {
        for kind in CounterKind::ALL {
            let mut counter = CounterBuilder::new(10).build::<String>(kind);
            assert_eq!(counter.kind(), kind);

            // Empty
            assert_eq!(counter.max_key(), None);
            assert_eq!(counter.min_key(), None);

            // Increment
            assert_eq!(counter.increment("one".to_string()), 1);
            assert_eq!(counter.increment("two".to_string()), 1);
            assert_eq!(counter.increment("two".to_string()), 2);

            // Extremes
            assert_eq!(counter.max_key(), Some(&"two".to_string()));
            assert_eq!(counter.min_key(), Some(&"one".to_string()));
            assert_eq!(counter.max_count(), Some(2));
            assert_eq!(counter.min_count(), Some(1));

            // Decrement
            assert_eq!(counter.decrement(&"one".to_string()), Some(0));
            assert_eq!(counter.decrement(&"nope".to_string()), None);
            assert!(!counter.contains(&"one".to_string()));
            assert_eq!(counter.count(&"two".to_string()), Some(2));
            assert_eq!(counter.len(), 1);

            // Clear
            counter.clear();
            assert!(counter.is_empty());
        }
    }

    #[test]
    fn test_default_kind_is_buckets() {
        assert_eq!(CounterKind::default(), CounterKind::Buckets);
        let counter = CounterBuilder::default().build::<u8>(CounterKind::default());
        assert_eq!(counter.kind(), CounterKind::Buckets);
    }

    #[test]
    fn test_counter_usable_through_trait() {
        fn bump<C: CountedKeys<u32>>(c: &mut C) {
            c.increment(1);
            c.increment(1);
            c.increment(2);
        }

        let mut counter = CounterBuilder::new(4).build::<u32>(CounterKind::Ordered);
        bump(&mut counter);
        assert_eq!(CountedKeys::max_key(&counter), Some(&1));
        assert_eq!(CountedKeys::min_key(&counter), Some(&2));
    }
}
