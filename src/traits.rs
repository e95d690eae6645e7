//! # Counted-Key Trait
//!
//! One contract, three implementations. Every store in this crate tracks a
//! positive count per key and answers "which key has the highest count" and
//! "which key has the lowest count". They differ only in how much work those
//! two questions cost.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌─────────────────────────────────────────┐
//!                  │            CountedKeys<K>               │
//!                  │                                         │
//!                  │  increment(&mut, K) → u64               │
//!                  │  decrement(&mut, &K) → Option<u64>      │
//!                  │  max_key(&) → Option<&K>                │
//!                  │  min_key(&) → Option<&K>                │
//!                  │  count / contains / len / clear         │
//!                  └───────────────────┬─────────────────────┘
//!                                      │
//!        ┌─────────────────────────────┼─────────────────────────────┐
//!        ▼                             ▼                             ▼
//!  ┌──────────────┐           ┌──────────────────┐          ┌──────────────────┐
//!  │ ScanCounter  │           │  OrderedCounter  │          │   CountBuckets   │
//!  │ max/min O(n) │           │ max/min O(log d) │          │  everything O(1) │
//!  └──────────────┘           └──────────────────┘          └──────────────────┘
//!
//!  StrCountedKeys (blanket over CountedKeys<String>)
//!    max_key_or_empty / min_key_or_empty → "" when empty
//! ```
//!
//! ## Semantics shared by all implementations
//!
//! | Operation          | Absent key              | Present key (count `c`)          |
//! |--------------------|-------------------------|----------------------------------|
//! | `increment(k)`     | inserted at 1, returns 1| `c + 1` (saturates at `u64::MAX`)|
//! | `decrement(&k)`    | no-op, returns `None`   | `c - 1`; removed at 0, `Some(0)` |
//!
//! `max_key`/`min_key` return `None` on an empty store. When several keys tie
//! for the extreme count, any one of them may be returned.
//!
//! ## Example
//!
//! ```
//! use countkit::counter::ScanCounter;
//! use countkit::ds::CountBuckets;
//! use countkit::traits::CountedKeys;
//!
//! fn hottest<C: CountedKeys<&'static str>>(store: &mut C) -> Option<&'static str> {
//!     store.increment("a");
//!     store.increment("b");
//!     store.increment("b");
//!     store.max_key().copied()
//! }
//!
//! assert_eq!(hottest(&mut CountBuckets::new()), Some("b"));
//! assert_eq!(hottest(&mut ScanCounter::new()), Some("b"));
//! ```

/// Per-key counter with extremal-key queries.
pub trait CountedKeys<K> {
    /// Adds one to `key`'s count, inserting it at 1 if absent. Returns the new
    /// count.
    fn increment(&mut self, key: K) -> u64;

    /// Subtracts one from `key`'s count, removing the key when it reaches 0.
    ///
    /// Returns `None` (and changes nothing) if the key is absent, otherwise
    /// the new count, where `Some(0)` means the key was removed.
    fn decrement(&mut self, key: &K) -> Option<u64>;

    /// Returns a key holding the maximum count, or `None` if empty.
    fn max_key(&self) -> Option<&K>;

    /// Returns a key holding the minimum count, or `None` if empty.
    fn min_key(&self) -> Option<&K>;

    /// Returns `key`'s current count, if live.
    fn count(&self, key: &K) -> Option<u64>;

    /// Number of live keys.
    fn len(&self) -> usize;

    /// Drops every key.
    fn clear(&mut self);

    fn contains(&self, key: &K) -> bool {
        self.count(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The highest live count.
    fn max_count(&self) -> Option<u64> {
        self.max_key().and_then(|key| self.count(key))
    }

    /// The lowest live count.
    fn min_count(&self) -> Option<u64> {
        self.min_key().and_then(|key| self.count(key))
    }
}

/// String-keyed convenience: extremal queries with an empty-string sentinel.
///
/// ```
/// use countkit::ds::CountBuckets;
/// use countkit::traits::{CountedKeys, StrCountedKeys};
///
/// let mut store: CountBuckets<String> = CountBuckets::new();
/// assert_eq!(store.max_key_or_empty(), "");
///
/// store.increment("x".to_string());
/// assert_eq!(store.min_key_or_empty(), "x");
/// ```
pub trait StrCountedKeys: CountedKeys<String> {
    fn max_key_or_empty(&self) -> &str {
        self.max_key().map(String::as_str).unwrap_or("")
    }

    fn min_key_or_empty(&self) -> &str {
        self.min_key().map(String::as_str).unwrap_or("")
    }
}

impl<T> StrCountedKeys for T where T: CountedKeys<String> + ?Sized {}
