//! Count buckets for O(1) max/min key tracking.
//!
//! Tracks a positive count per key and answers "a key with the highest count"
//! and "a key with the lowest count" in O(1). Keys sharing a count live in one
//! bucket; buckets form a doubly-linked list sorted by count, so the extremes
//! are the list's head and tail.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          CountBuckets<K> Layout                             │
//! │                                                                             │
//! │   ┌─────────────────────────────┐   ┌─────────────────────────────────┐   │
//! │   │  index: FxHashMap<K, SlotId>│   │  entries: SlotArena<Entry<K>>   │   │
//! │   │                             │   │                                 │   │
//! │   │  ┌───────────┬──────────┐  │   │  ┌──────┬───────────────────┐  │   │
//! │   │  │    Key    │  SlotId  │  │   │  │ Slot │ Entry             │  │   │
//! │   │  ├───────────┼──────────┤  │   │  ├──────┼───────────────────┤  │   │
//! │   │  │    "a"    │   e0     │──┼───┼──►│  e0  │ count:1, bucket:b0│  │   │
//! │   │  │    "b"    │   e1     │──┼───┼──►│  e1  │ count:2, bucket:b1│  │   │
//! │   │  │    "c"    │   e2     │──┼───┼──►│  e2  │ count:3, bucket:b2│  │   │
//! │   │  └───────────┴──────────┘  │   │  └──────┴───────────────────┘  │   │
//! │   └─────────────────────────────┘   └─────────────────────────────────┘   │
//! │                                                                             │
//! │   ┌───────────────────────────────────────────────────────────────────┐   │
//! │   │  buckets: SlotArena<Bucket>  (ascending by count)                 │   │
//! │   │                                                                   │   │
//! │   │  head                                                    tail     │   │
//! │   │   │                                                        │      │   │
//! │   │   ▼                                                        ▼      │   │
//! │   │  [b0 count=1] ◄──► [b1 count=2] ◄──► [b2 count=3]                 │   │
//! │   │   members: e0       members: e1       members: e2                 │   │
//! │   │                                                                   │   │
//! │   │  min_key() = first member of head                                 │   │
//! │   │  max_key() = first member of tail                                 │   │
//! │   └───────────────────────────────────────────────────────────────────┘   │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//!
//! Increment Flow
//! ──────────────
//!
//!   increment("b"):                       (b at count 2 in bucket b1)
//!     1. Lookup e1 in index, read entry.bucket = b1
//!     2. Unlink e1 from b1's member list
//!     3. If b1.next has count 3 → join it
//!        else → link a new count-3 bucket between b1 and b1.next
//!     4. Append e1 to the target bucket, update entry.count/bucket
//!     5. If b1 is now empty → unlink and free it
//!
//! Decrement Flow
//! ──────────────
//!
//!   decrement("b"):
//!     count == 1 → unlink from bucket, free entry, drop index
//!     count  > 1 → mirror of increment, looking at b1.prev for count-1
//! ```
//!
//! The target bucket is always linked relative to the key's old bucket while
//! that bucket is still in the list; the old bucket is freed last. No search
//! over the bucket list is ever needed because counts change by exactly one.
//!
//! ## Operations
//!
//! | Operation         | Time        | Notes                                   |
//! |-------------------|-------------|-----------------------------------------|
//! | `increment`       | O(1)        | Absent key starts at 1                  |
//! | `decrement`       | O(1)        | Removes the key at 0; absent is a no-op |
//! | `max_key`         | O(1)        | Oldest member of the tail bucket        |
//! | `min_key`         | O(1)        | Oldest member of the head bucket        |
//! | `count`           | O(1)        |                                         |
//! | `keys_with_count` | O(d)        | d = distinct counts, then O(1) per key  |
//! | `check_invariants`| O(n + d)    |                                         |
//!
//! ## Example Usage
//!
//! ```
//! use countkit::ds::CountBuckets;
//!
//! let mut store = CountBuckets::new();
//!
//! store.increment("a");
//! store.increment("b");
//! store.increment("b");
//!
//! assert_eq!(store.max_key(), Some(&"b"));
//! assert_eq!(store.min_key(), Some(&"a"));
//!
//! store.decrement("a");  // count 1 → removed
//! assert!(!store.contains("a"));
//! assert_eq!(store.min_key(), Some(&"b"));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe. Mutations relink shared list nodes without locking;
//! callers serialise access.
//!
//! ## Implementation Notes
//!
//! - Within a bucket members are kept in arrival order (append at tail)
//! - Counts saturate at `u64::MAX`
//! - `debug_validate_invariants()` available in debug/test builds

use std::borrow::Borrow;
use std::hash::Hash;
use std::iter::FusedIterator;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CounterMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CounterMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    BucketMetricsRecorder, CounterMetricsReadRecorder, CounterMetricsRecorder,
    MetricsSnapshotProvider,
};
use crate::traits::CountedKeys;

/// Key record. Link pointers first; they are touched on every move.
#[derive(Debug)]
#[repr(C)]
struct Entry<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    bucket: SlotId,
    count: u64,
    key: K,
}

#[derive(Debug)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    prev: Option<SlotId>,
    next: Option<SlotId>,
    count: u64,
}

/// Default bucket pre-allocation. Counts in typical workloads cluster low.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

/// O(1) counted-key store backed by an ordered list of count buckets.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone` (the key is stored in both
///   the index and its record)
///
/// # Example
///
/// ```
/// use countkit::ds::CountBuckets;
///
/// let mut store: CountBuckets<String> = CountBuckets::new();
///
/// for word in "the cat saw the dog and the bird".split(' ') {
///     store.increment(word.to_string());
/// }
///
/// assert_eq!(store.max_key().map(String::as_str), Some("the"));
/// assert_eq!(store.max_count(), Some(3));
/// assert_eq!(store.min_count(), Some(1));
/// assert_eq!(store.count("cat"), Some(1));
/// ```
#[derive(Debug)]
pub struct CountBuckets<K> {
    entries: SlotArena<Entry<K>>,
    buckets: SlotArena<Bucket>,
    index: FxHashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    #[cfg(feature = "metrics")]
    metrics: CounterMetrics,
}

impl<K> CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty store.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let store: CountBuckets<&str> = CountBuckets::new();
    /// assert!(store.is_empty());
    /// assert_eq!(store.max_key(), None);
    /// ```
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            buckets: SlotArena::new(),
            index: FxHashMap::default(),
            head: None,
            tail: None,
            #[cfg(feature = "metrics")]
            metrics: CounterMetrics::default(),
        }
    }

    /// Creates an empty store with room for `capacity` keys.
    ///
    /// Uses [`DEFAULT_BUCKET_PREALLOC`] for the bucket arena.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_bucket_hint(capacity, DEFAULT_BUCKET_PREALLOC)
    }

    /// Creates an empty store with room for `capacity` keys and `bucket_hint`
    /// distinct counts.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let store: CountBuckets<u64> = CountBuckets::with_capacity_and_bucket_hint(1024, 8);
    /// assert!(store.is_empty());
    /// ```
    pub fn with_capacity_and_bucket_hint(capacity: usize, bucket_hint: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            buckets: SlotArena::with_capacity(bucket_hint),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            #[cfg(feature = "metrics")]
            metrics: CounterMetrics::default(),
        }
    }

    /// Returns the number of live keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct counts (non-empty buckets).
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment("a");
    /// store.increment("b");
    /// assert_eq!(store.bucket_count(), 1);
    ///
    /// store.increment("b");
    /// assert_eq!(store.bucket_count(), 2);
    /// ```
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if `key` is live.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Returns the current count of `key`, if live.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store: CountBuckets<String> = CountBuckets::new();
    /// store.increment("hello".to_string());
    /// store.increment("hello".to_string());
    ///
    /// // Query with &str instead of String
    /// assert_eq!(store.count("hello"), Some(2));
    /// assert_eq!(store.count("missing"), None);
    /// ```
    #[inline]
    pub fn count<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.count)
    }

    /// Adds one to `key`'s count and returns the new count.
    ///
    /// An absent key is inserted at count 1, joining the head bucket if it
    /// already holds count 1. A key at `u64::MAX` stays there.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// assert_eq!(store.increment("k"), 1);
    /// assert_eq!(store.increment("k"), 2);
    /// assert_eq!(store.increment("k"), 3);
    /// ```
    #[inline]
    pub fn increment(&mut self, key: K) -> u64 {
        if let Some(&id) = self.index.get(&key) {
            return self.promote(id);
        }
        self.insert_new(key);
        1
    }

    /// Increments every key in `keys`; returns how many were newly inserted.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// let inserted = store.increment_batch(["a", "b", "a", "c"]);
    ///
    /// assert_eq!(inserted, 3);
    /// assert_eq!(store.count(&"a"), Some(2));
    /// ```
    pub fn increment_batch<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
    {
        let mut inserted = 0;
        for key in keys {
            if self.increment(key) == 1 {
                inserted += 1;
            }
        }
        inserted
    }

    /// Subtracts one from `key`'s count.
    ///
    /// Returns `None` without touching anything if `key` is absent. Otherwise
    /// returns the new count; `Some(0)` means the key was removed.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment("k");
    /// store.increment("k");
    ///
    /// assert_eq!(store.decrement(&"k"), Some(1));
    /// assert_eq!(store.decrement(&"k"), Some(0));
    /// assert_eq!(store.decrement(&"k"), None);
    /// assert!(store.is_empty());
    /// ```
    #[inline]
    pub fn decrement<Q>(&mut self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(&id) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_missing();
            return None;
        };
        let remaining = self.demote(id);
        if remaining == 0 {
            self.index.remove(key);
        }
        Some(remaining)
    }

    /// Decrements every key in `keys`; returns how many were live.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment_batch(["a", "b"]);
    ///
    /// assert_eq!(store.decrement_batch(["a", "missing"]), 1);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn decrement_batch<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
    {
        let mut found = 0;
        for key in keys {
            if self.decrement(&key).is_some() {
                found += 1;
            }
        }
        found
    }

    /// Returns a key holding the maximum count.
    ///
    /// Among ties, the key that reached that count earliest is returned.
    /// Callers should not depend on which one.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// assert_eq!(store.max_key(), None);
    ///
    /// store.increment("a");
    /// store.increment("b");
    /// store.increment("b");
    /// assert_eq!(store.max_key(), Some(&"b"));
    /// ```
    #[inline]
    pub fn max_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_max_key_call();
        self.peek_max().map(|(key, _)| key)
    }

    /// Returns a key holding the minimum count.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment("a");
    /// store.increment("a");
    /// store.increment("b");
    /// assert_eq!(store.min_key(), Some(&"b"));
    /// ```
    #[inline]
    pub fn min_key(&self) -> Option<&K> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_min_key_call();
        self.peek_min().map(|(key, _)| key)
    }

    /// Peeks `(key, count)` for a key at the maximum count.
    pub fn peek_max(&self) -> Option<(&K, u64)> {
        self.first_member(self.tail?)
    }

    /// Peeks `(key, count)` for a key at the minimum count.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment("a");
    /// store.increment("b");
    /// store.increment("b");
    ///
    /// assert_eq!(store.peek_min(), Some((&"a", 1)));
    /// assert_eq!(store.peek_max(), Some((&"b", 2)));
    /// ```
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        self.first_member(self.head?)
    }

    /// Returns the highest live count.
    pub fn max_count(&self) -> Option<u64> {
        self.buckets.get(self.tail?).map(|bucket| bucket.count)
    }

    /// Returns the lowest live count.
    pub fn min_count(&self) -> Option<u64> {
        self.buckets.get(self.head?).map(|bucket| bucket.count)
    }

    /// Iterates `(key, count)` pairs in ascending count order.
    ///
    /// Keys sharing a count are yielded in arrival order.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment_batch(["x", "y", "y", "z", "z", "z"]);
    ///
    /// let pairs: Vec<_> = store.iter().map(|(k, c)| (*k, c)).collect();
    /// assert_eq!(pairs, vec![("x", 1), ("y", 2), ("z", 3)]);
    /// ```
    pub fn iter(&self) -> CountBucketsIter<'_, K> {
        CountBucketsIter {
            entries: &self.entries,
            buckets: &self.buckets,
            next_bucket: self.head,
            current: None,
            remaining: self.entries.len(),
        }
    }

    /// Iterates the distinct live counts, ascending.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment_batch(["a", "b", "b", "b"]);
    ///
    /// let counts: Vec<_> = store.iter_counts().collect();
    /// assert_eq!(counts, vec![1, 3]);
    /// ```
    pub fn iter_counts(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(self.head, move |&id| self.buckets.get(id)?.next)
            .filter_map(move |id| self.buckets.get(id).map(|bucket| bucket.count))
    }

    /// Iterates the keys currently at exactly `count`, in arrival order.
    ///
    /// Locating the bucket walks the list from the head, so this costs
    /// O(distinct counts) before the first key.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment_batch(["a", "b", "c", "c"]);
    ///
    /// let ones: Vec<_> = store.keys_with_count(1).copied().collect();
    /// assert_eq!(ones, vec!["a", "b"]);
    /// assert_eq!(store.keys_with_count(7).count(), 0);
    /// ```
    pub fn keys_with_count(&self, count: u64) -> BucketKeysIter<'_, K> {
        let mut current = self.head;
        let mut first = None;
        while let Some(bucket) = current.and_then(|id| self.buckets.get(id)) {
            if bucket.count >= count {
                if bucket.count == count {
                    first = bucket.head;
                }
                break;
            }
            current = bucket.next;
        }
        BucketKeysIter {
            entries: &self.entries,
            current: first,
        }
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.entries.clear();
        self.buckets.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Removes every key and releases spare storage.
    pub fn clear_shrink(&mut self) {
        self.clear();
        self.entries.shrink_to_fit();
        self.buckets.shrink_to_fit();
        self.index.shrink_to_fit();
    }

    /// Returns an approximate memory footprint in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let store: CountBuckets<u64> = CountBuckets::with_capacity(64);
    /// assert!(store.approx_bytes() > 0);
    /// ```
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.entries.approx_bytes()
            + self.buckets.approx_bytes()
            + self.index.capacity() * std::mem::size_of::<(K, SlotId)>()
    }

    /// Walks the whole structure and reports the first broken invariant.
    ///
    /// Checks that buckets are non-empty and strictly ascending, that the
    /// head/tail pointers and all back-links agree, and that every key record
    /// sits in the bucket it points at with a matching count.
    ///
    /// # Example
    ///
    /// ```
    /// use countkit::ds::CountBuckets;
    ///
    /// let mut store = CountBuckets::new();
    /// store.increment_batch(["a", "b", "b"]);
    /// store.decrement(&"a");
    /// assert!(store.check_invariants().is_ok());
    /// ```
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.entries.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but {} records are live",
                self.index.len(),
                self.entries.len()
            )));
        }

        let mut current = self.head;
        let mut prev_bucket: Option<SlotId> = None;
        let mut prev_count = 0u64;
        let mut buckets_seen = 0usize;
        let mut members_seen = 0usize;

        while let Some(bucket_id) = current {
            let bucket = self.buckets.get(bucket_id).ok_or_else(|| {
                InvariantError::new(format!("stale bucket handle {}", bucket_id.index()))
            })?;
            if bucket.prev != prev_bucket {
                return Err(InvariantError::new(format!(
                    "bucket {} prev link inconsistent",
                    bucket_id.index()
                )));
            }
            if bucket.count <= prev_count {
                return Err(InvariantError::new(format!(
                    "bucket counts not strictly ascending: {} after {}",
                    bucket.count, prev_count
                )));
            }
            if bucket.len == 0 {
                return Err(InvariantError::new(format!(
                    "bucket for count {} is empty",
                    bucket.count
                )));
            }

            let mut member = bucket.head;
            let mut last: Option<SlotId> = None;
            let mut len = 0usize;
            while let Some(entry_id) = member {
                let entry = self.entries.get(entry_id).ok_or_else(|| {
                    InvariantError::new(format!("stale entry handle {}", entry_id.index()))
                })?;
                if entry.bucket != bucket_id {
                    return Err(InvariantError::new(format!(
                        "entry {} listed in bucket {} but points at bucket {}",
                        entry_id.index(),
                        bucket_id.index(),
                        entry.bucket.index()
                    )));
                }
                if entry.count != bucket.count {
                    return Err(InvariantError::new(format!(
                        "entry {} has count {} inside bucket for count {}",
                        entry_id.index(),
                        entry.count,
                        bucket.count
                    )));
                }
                if entry.prev != last {
                    return Err(InvariantError::new(format!(
                        "entry {} prev link inconsistent",
                        entry_id.index()
                    )));
                }
                if self.index.get(&entry.key) != Some(&entry_id) {
                    return Err(InvariantError::new(format!(
                        "entry {} not indexed under its key",
                        entry_id.index()
                    )));
                }
                last = Some(entry_id);
                member = entry.next;
                len += 1;
            }
            if bucket.tail != last {
                return Err(InvariantError::new(format!(
                    "bucket for count {} has a stale tail",
                    bucket.count
                )));
            }
            if bucket.len != len {
                return Err(InvariantError::new(format!(
                    "bucket for count {} reports {} members, holds {}",
                    bucket.count, bucket.len, len
                )));
            }

            members_seen += len;
            buckets_seen += 1;
            prev_count = bucket.count;
            prev_bucket = Some(bucket_id);
            current = bucket.next;
        }

        if self.tail != prev_bucket {
            return Err(InvariantError::new("tail does not point at the last bucket"));
        }
        if buckets_seen != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "{} buckets allocated, {} reachable",
                self.buckets.len(),
                buckets_seen
            )));
        }
        if members_seen != self.entries.len() {
            return Err(InvariantError::new(format!(
                "{} records live, {} reachable from buckets",
                self.entries.len(),
                members_seen
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("count buckets invariant violated: {err}");
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns a debug snapshot of the bucket chain, head to tail.
    pub fn debug_snapshot(&self) -> CountBucketsSnapshot<K> {
        let mut buckets = Vec::with_capacity(self.buckets.len());
        let mut current = self.head;
        while let Some(bucket_id) = current {
            let Some(bucket) = self.buckets.get(bucket_id) else {
                break;
            };
            let members = std::iter::successors(bucket.head, |&id| self.entries.get(id)?.next)
                .filter_map(|id| self.entries.get(id).map(|entry| (id, entry.key.clone())))
                .collect();
            buckets.push(BucketDebug {
                id: bucket_id,
                count: bucket.count,
                members,
            });
            current = bucket.next;
        }
        CountBucketsSnapshot {
            entries_len: self.entries.len(),
            index_len: self.index.len(),
            head: self.head,
            tail: self.tail,
            buckets,
        }
    }

    fn first_member(&self, bucket_id: SlotId) -> Option<(&K, u64)> {
        let bucket = self.buckets.get(bucket_id)?;
        let entry = self.entries.get(bucket.head?)?;
        Some((&entry.key, entry.count))
    }

    fn insert_new(&mut self, key: K) {
        let bucket_id = match self.head {
            Some(head) if self.bucket(head).count == 1 => head,
            head => self.link_bucket(1, None, head),
        };
        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            bucket: bucket_id,
            count: 1,
            key: key.clone(),
        });
        self.index.insert(key, id);
        self.push_member(bucket_id, id);
        #[cfg(feature = "metrics")]
        self.metrics.record_increment_new();
    }

    /// Moves `id` one bucket toward the tail. Returns the new count.
    fn promote(&mut self, id: SlotId) -> u64 {
        let (from, count) = {
            let entry = self.entry(id);
            (entry.bucket, entry.count)
        };
        if count == u64::MAX {
            #[cfg(feature = "metrics")]
            self.metrics.record_increment_saturated();
            return count;
        }
        let target = count + 1;
        let next = self.bucket(from).next;

        self.unlink_member(from, id);
        let to = match next {
            Some(next) if self.bucket(next).count == target => next,
            _ => self.link_bucket(target, Some(from), next),
        };
        self.settle(id, to, target);
        self.release_if_empty(from);

        #[cfg(feature = "metrics")]
        self.metrics.record_increment_existing();
        target
    }

    /// Moves `id` one bucket toward the head, freeing it at count 1.
    /// Returns the new count. The caller drops the index entry on 0.
    fn demote(&mut self, id: SlotId) -> u64 {
        let (from, count) = {
            let entry = self.entry(id);
            (entry.bucket, entry.count)
        };
        self.unlink_member(from, id);

        if count == 1 {
            self.entries.remove(id);
            self.release_if_empty(from);
            #[cfg(feature = "metrics")]
            self.metrics.record_decrement_removed();
            return 0;
        }

        let target = count - 1;
        let prev = self.bucket(from).prev;
        let to = match prev {
            Some(prev) if self.bucket(prev).count == target => prev,
            _ => self.link_bucket(target, prev, Some(from)),
        };
        self.settle(id, to, target);
        self.release_if_empty(from);

        #[cfg(feature = "metrics")]
        self.metrics.record_decrement_existing();
        target
    }

    fn settle(&mut self, id: SlotId, bucket_id: SlotId, count: u64) {
        let entry = self.entry_mut(id);
        entry.bucket = bucket_id;
        entry.count = count;
        self.push_member(bucket_id, id);
    }

    fn entry(&self, id: SlotId) -> &Entry<K> {
        self.entries.get(id).expect("stale entry handle")
    }

    fn entry_mut(&mut self, id: SlotId) -> &mut Entry<K> {
        self.entries.get_mut(id).expect("stale entry handle")
    }

    fn bucket(&self, id: SlotId) -> &Bucket {
        self.buckets.get(id).expect("stale bucket handle")
    }

    fn bucket_mut(&mut self, id: SlotId) -> &mut Bucket {
        self.buckets.get_mut(id).expect("stale bucket handle")
    }

    /// Allocates an empty bucket for `count` and splices it between `prev`
    /// and `next`, which must be adjacent (or list ends).
    fn link_bucket(&mut self, count: u64, prev: Option<SlotId>, next: Option<SlotId>) -> SlotId {
        let id = self.buckets.insert(Bucket {
            head: None,
            tail: None,
            len: 0,
            prev,
            next,
            count,
        });
        match prev {
            Some(prev) => self.bucket_mut(prev).next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self.bucket_mut(next).prev = Some(id),
            None => self.tail = Some(id),
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_bucket_created();
        id
    }

    fn release_if_empty(&mut self, id: SlotId) {
        if self.bucket(id).len > 0 {
            return;
        }
        let Some(bucket) = self.buckets.remove(id) else {
            return;
        };
        match bucket.prev {
            Some(prev) => self.bucket_mut(prev).next = bucket.next,
            None => self.head = bucket.next,
        }
        match bucket.next {
            Some(next) => self.bucket_mut(next).prev = bucket.prev,
            None => self.tail = bucket.prev,
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_bucket_removed();
    }

    fn push_member(&mut self, bucket_id: SlotId, id: SlotId) {
        let old_tail = self.bucket(bucket_id).tail;
        {
            let entry = self.entry_mut(id);
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail {
            Some(old_tail) => self.entry_mut(old_tail).next = Some(id),
            None => self.bucket_mut(bucket_id).head = Some(id),
        }
        let bucket = self.bucket_mut(bucket_id);
        bucket.tail = Some(id);
        bucket.len += 1;
    }

    fn unlink_member(&mut self, bucket_id: SlotId, id: SlotId) {
        let (prev, next) = {
            let entry = self.entry(id);
            (entry.prev, entry.next)
        };
        match prev {
            Some(prev) => self.entry_mut(prev).next = next,
            None => self.bucket_mut(bucket_id).head = next,
        }
        match next {
            Some(next) => self.entry_mut(next).prev = prev,
            None => self.bucket_mut(bucket_id).tail = prev,
        }
        let entry = self.entry_mut(id);
        entry.prev = None;
        entry.next = None;
        self.bucket_mut(bucket_id).len -= 1;
    }
}

#[cfg(feature = "metrics")]
impl<K> CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> CounterMetricsSnapshot {
        CounterMetricsSnapshot::capture(&self.metrics, self.len(), self.bucket_count())
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsSnapshotProvider<CounterMetricsSnapshot> for CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CounterMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K> Default for CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CountedKeys<K> for CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn increment(&mut self, key: K) -> u64 {
        CountBuckets::increment(self, key)
    }

    fn decrement(&mut self, key: &K) -> Option<u64> {
        CountBuckets::decrement(self, key)
    }

    fn max_key(&self) -> Option<&K> {
        CountBuckets::max_key(self)
    }

    fn min_key(&self) -> Option<&K> {
        CountBuckets::min_key(self)
    }

    fn count(&self, key: &K) -> Option<u64> {
        CountBuckets::count(self, key)
    }

    fn len(&self) -> usize {
        CountBuckets::len(self)
    }

    fn clear(&mut self) {
        CountBuckets::clear(self)
    }

    fn contains(&self, key: &K) -> bool {
        CountBuckets::contains(self, key)
    }

    fn max_count(&self) -> Option<u64> {
        CountBuckets::max_count(self)
    }

    fn min_count(&self) -> Option<u64> {
        CountBuckets::min_count(self)
    }
}

impl<'a, K> IntoIterator for &'a CountBuckets<K>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, u64);
    type IntoIter = CountBucketsIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending `(key, count)` iterator returned by [`CountBuckets::iter`].
#[derive(Debug)]
pub struct CountBucketsIter<'a, K> {
    entries: &'a SlotArena<Entry<K>>,
    buckets: &'a SlotArena<Bucket>,
    next_bucket: Option<SlotId>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, K> Iterator for CountBucketsIter<'a, K> {
    type Item = (&'a K, u64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.current {
                let entry = self.entries.get(id)?;
                self.current = entry.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&entry.key, entry.count));
            }
            let bucket = self.buckets.get(self.next_bucket?)?;
            self.current = bucket.head;
            self.next_bucket = bucket.next;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for CountBucketsIter<'_, K> {}
impl<K> FusedIterator for CountBucketsIter<'_, K> {}

/// Keys of one bucket, returned by [`CountBuckets::keys_with_count`].
#[derive(Debug)]
pub struct BucketKeysIter<'a, K> {
    entries: &'a SlotArena<Entry<K>>,
    current: Option<SlotId>,
}

impl<'a, K> Iterator for BucketKeysIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.current?)?;
        self.current = entry.next;
        Some(&entry.key)
    }
}

impl<K> FusedIterator for BucketKeysIter<'_, K> {}

#[cfg(any(test, debug_assertions))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDebug<K> {
    pub id: SlotId,
    pub count: u64,
    pub members: Vec<(SlotId, K)>,
}

#[cfg(any(test, debug_assertions))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountBucketsSnapshot<K> {
    pub entries_len: usize,
    pub index_len: usize,
    pub head: Option<SlotId>,
    pub tail: Option<SlotId>,
    pub buckets: Vec<BucketDebug<K>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_at<K: Eq + Hash + Clone + Ord>(store: &CountBuckets<K>, count: u64) -> Vec<K> {
        let mut keys: Vec<K> = store.keys_with_count(count).cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn count_buckets_basic_flow() {
        let mut store = CountBuckets::new();
        assert_eq!(store.increment("a"), 1);
        assert_eq!(store.increment("b"), 1);
        assert_eq!(store.increment("b"), 2);

        assert_eq!(store.count(&"a"), Some(1));
        assert_eq!(store.count(&"b"), Some(2));
        assert_eq!(store.max_key(), Some(&"b"));
        assert_eq!(store.min_key(), Some(&"a"));
        assert_eq!(store.bucket_count(), 2);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_debug_snapshot() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "c", "c"]);

        let snapshot = store.debug_snapshot();
        assert_eq!(snapshot.entries_len, 3);
        assert_eq!(snapshot.index_len, 3);
        assert_eq!(snapshot.buckets.len(), 2);
        assert_eq!(snapshot.head, Some(snapshot.buckets[0].id));
        assert_eq!(snapshot.tail, Some(snapshot.buckets[1].id));

        let ones: Vec<_> = snapshot.buckets[0].members.iter().map(|(_, k)| *k).collect();
        assert_eq!(snapshot.buckets[0].count, 1);
        assert_eq!(ones, vec!["a", "b"]);
        assert_eq!(snapshot.buckets[1].count, 2);
        assert_eq!(snapshot.buckets[1].members.len(), 1);
    }

    #[test]
    fn count_buckets_empty_queries() {
        let store: CountBuckets<&str> = CountBuckets::new();
        assert_eq!(store.max_key(), None);
        assert_eq!(store.min_key(), None);
        assert_eq!(store.peek_max(), None);
        assert_eq!(store.peek_min(), None);
        assert_eq!(store.max_count(), None);
        assert_eq!(store.min_count(), None);
        assert_eq!(store.iter().count(), 0);
        assert_eq!(store.iter_counts().count(), 0);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_new_key_joins_existing_count_one_bucket() {
        let mut store = CountBuckets::new();
        store.increment("a");
        store.increment("b");
        store.increment("c");
        assert_eq!(store.bucket_count(), 1);
        assert_eq!(keys_at(&store, 1), vec!["a", "b", "c"]);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_new_key_creates_head_bucket_when_min_above_one() {
        let mut store = CountBuckets::new();
        store.increment("a");
        store.increment("a");
        assert_eq!(store.min_count(), Some(2));

        store.increment("b");
        assert_eq!(store.min_count(), Some(1));
        assert_eq!(store.min_key(), Some(&"b"));
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![1, 2]);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_increment_joins_adjacent_bucket() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b"]);
        store.increment("a");
        // a moved into b's bucket; count-1 bucket released.
        assert_eq!(store.bucket_count(), 1);
        assert_eq!(keys_at(&store, 2), vec!["a", "b"]);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_increment_inserts_between_non_adjacent_counts() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b", "b"]);
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![1, 3]);

        store.increment("a");
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(store.min_key(), Some(&"a"));
        assert_eq!(store.max_key(), Some(&"b"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_increment_keeps_shared_bucket_alive() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b"]);
        store.increment("a");
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.min_key(), Some(&"b"));
        assert_eq!(store.max_key(), Some(&"a"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_decrement_missing_is_noop() {
        let mut store = CountBuckets::new();
        store.increment("a");
        assert_eq!(store.decrement(&"zzz"), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.count(&"a"), Some(1));
        assert_eq!(store.bucket_count(), 1);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_decrement_at_one_removes_key_and_bucket() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b"]);
        assert_eq!(store.decrement(&"a"), Some(0));
        assert!(!store.contains(&"a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.bucket_count(), 1);
        assert_eq!(store.min_key(), Some(&"b"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_decrement_joins_previous_bucket() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b"]);
        assert_eq!(store.decrement(&"b"), Some(1));
        assert_eq!(store.bucket_count(), 1);
        assert_eq!(keys_at(&store, 1), vec!["a", "b"]);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_decrement_inserts_before_original_bucket() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b", "b", "c", "c", "c"]);
        // counts: a=1, b=3, c=3
        assert_eq!(store.decrement(&"b"), Some(2));
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(keys_at(&store, 2), vec!["b"]);
        assert_eq!(store.max_key(), Some(&"c"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_decrement_at_head_creates_new_head() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "a", "a"]);
        assert_eq!(store.decrement(&"a"), Some(2));
        assert_eq!(store.iter_counts().collect::<Vec<_>>(), vec![2]);
        assert_eq!(store.min_count(), Some(2));
        assert_eq!(store.max_count(), Some(2));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_reference_sequence() {
        let mut store = CountBuckets::new();
        store.increment("a");
        assert_eq!((store.min_key(), store.max_key()), (Some(&"a"), Some(&"a")));

        store.increment("b");
        store.increment("b");
        assert_eq!(store.max_key(), Some(&"b"));
        assert_eq!(store.min_key(), Some(&"a"));

        for _ in 0..3 {
            store.increment("c");
        }
        assert_eq!(store.max_key(), Some(&"c"));
        assert_eq!(store.min_key(), Some(&"a"));

        store.decrement(&"a");
        assert!(!store.contains(&"a"));
        assert_eq!(store.min_key(), Some(&"b"));
        assert_eq!(store.max_key(), Some(&"c"));

        store.decrement(&"b");
        store.decrement(&"b");
        assert!(!store.contains(&"b"));
        assert_eq!(store.min_key(), Some(&"c"));
        assert_eq!(store.max_key(), Some(&"c"));
        assert_eq!(store.len(), 1);
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_ties_return_some_tied_key() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "c"]);
        let max = *store.max_key().unwrap();
        let min = *store.min_key().unwrap();
        assert!(["a", "b", "c"].contains(&max));
        assert!(["a", "b", "c"].contains(&min));
    }

    #[test]
    fn count_buckets_round_trip_restores_counts() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b", "c", "c", "c"]);
        let before: Vec<_> = store.iter_counts().collect();

        store.increment("b");
        store.decrement(&"b");
        store.increment("new");
        store.decrement(&"new");

        assert_eq!(store.iter_counts().collect::<Vec<_>>(), before);
        assert_eq!(store.count(&"a"), Some(1));
        assert_eq!(store.count(&"b"), Some(2));
        assert_eq!(store.count(&"c"), Some(3));
        assert!(!store.contains(&"new"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_saturates_at_max() {
        let mut store = CountBuckets::new();
        store.increment("k");
        let id = store.index[&"k"];
        let bucket = store.entries.get(id).unwrap().bucket;
        store.entries.get_mut(id).unwrap().count = u64::MAX;
        store.buckets.get_mut(bucket).unwrap().count = u64::MAX;
        store.debug_validate_invariants();

        assert_eq!(store.increment("k"), u64::MAX);
        assert_eq!(store.count(&"k"), Some(u64::MAX));
        assert_eq!(store.decrement(&"k"), Some(u64::MAX - 1));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_string_keys_borrowed_lookup() {
        let mut store: CountBuckets<String> = CountBuckets::new();
        store.increment("alpha".to_string());
        store.increment("alpha".to_string());
        assert!(store.contains("alpha"));
        assert_eq!(store.count("alpha"), Some(2));
        assert_eq!(store.decrement("alpha"), Some(1));
        assert_eq!(store.decrement("beta"), None);
    }

    #[test]
    fn count_buckets_iter_is_ascending_and_exact() {
        let mut store = CountBuckets::new();
        store.increment_batch([3u32, 1, 3, 2, 3, 2]);
        let iter = store.iter();
        assert_eq!(iter.len(), 3);
        let pairs: Vec<_> = iter.map(|(k, c)| (*k, c)).collect();
        assert_eq!(pairs, vec![(1, 1), (2, 2), (3, 3)]);

        let via_into_iter: Vec<_> = (&store).into_iter().map(|(_, c)| c).collect();
        assert_eq!(via_into_iter, vec![1, 2, 3]);
    }

    #[test]
    fn count_buckets_keys_with_count_misses_between_buckets() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b", "b"]);
        assert_eq!(store.keys_with_count(2).count(), 0);
        assert_eq!(store.keys_with_count(0).count(), 0);
        assert_eq!(store.keys_with_count(3).copied().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn count_buckets_clear_resets_everything() {
        let mut store = CountBuckets::with_capacity(16);
        store.increment_batch(["a", "b", "b"]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.bucket_count(), 0);
        assert_eq!(store.max_key(), None);
        store.debug_validate_invariants();

        store.increment("c");
        assert_eq!(store.min_key(), Some(&"c"));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_clear_shrink_is_reusable() {
        let mut store = CountBuckets::with_capacity_and_bucket_hint(128, 64);
        for i in 0..100u32 {
            store.increment(i);
        }
        store.clear_shrink();
        assert!(store.is_empty());
        store.increment(7);
        assert_eq!(store.count(&7), Some(1));
        store.debug_validate_invariants();
    }

    #[test]
    fn count_buckets_batches_report_effect() {
        let mut store = CountBuckets::new();
        assert_eq!(store.increment_batch(["a", "a", "b"]), 2);
        assert_eq!(store.decrement_batch(["a", "a", "a", "c"]), 2);
        assert!(!store.contains(&"a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn count_buckets_check_invariants_detects_corruption() {
        let mut store = CountBuckets::new();
        store.increment_batch(["a", "b", "b"]);
        assert!(store.check_invariants().is_ok());

        let id = store.index[&"a"];
        store.entries.get_mut(id).unwrap().count = 5;
        let err = store.check_invariants().unwrap_err();
        assert!(err.message().contains("count 5"));
    }

    #[test]
    fn count_buckets_trait_object_usage() {
        let mut store = CountBuckets::new();
        let dyn_store: &mut dyn CountedKeys<&str> = &mut store;
        dyn_store.increment("x");
        dyn_store.increment("x");
        dyn_store.increment("y");
        assert_eq!(dyn_store.max_count(), Some(2));
        assert_eq!(dyn_store.min_count(), Some(1));
        assert_eq!(dyn_store.decrement(&"y"), Some(0));
        assert!(!dyn_store.contains(&"y"));
        assert_eq!(dyn_store.len(), 1);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn count_buckets_metrics_track_bucket_churn() {
        let mut store = CountBuckets::new();
        store.increment("a"); // new bucket 1
        store.increment("a"); // new bucket 2, bucket 1 released
        store.decrement(&"missing");
        store.decrement(&"a"); // new bucket 1, bucket 2 released
        store.decrement(&"a"); // removed, bucket 1 released
        let _ = store.max_key();
        let _ = store.min_key();

        let snap = store.metrics_snapshot();
        assert_eq!(snap.increment_calls, 2);
        assert_eq!(snap.increment_new, 1);
        assert_eq!(snap.decrement_calls, 3);
        assert_eq!(snap.decrement_missing, 1);
        assert_eq!(snap.decrement_removed, 1);
        assert_eq!(snap.buckets_created, 3);
        assert_eq!(snap.buckets_removed, 3);
        assert_eq!(snap.max_key_calls, 1);
        assert_eq!(snap.min_key_calls, 1);
        assert_eq!(snap.scan_steps, 0);
        assert_eq!(snap.live_keys, 0);
        assert_eq!(snap.distinct_counts, 0);

        store.reset_metrics();
        assert_eq!(store.metrics_snapshot().increment_calls, 0);
    }
}
