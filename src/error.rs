//! Error types for the countkit library.
//!
//! The counting operations themselves never fail: decrementing an absent key
//! is a no-op and querying an empty store yields `None`. The only error type
//! is [`InvariantError`], returned by structural self-checks such as
//! [`CountBuckets::check_invariants`](crate::ds::CountBuckets::check_invariants).
//!
//! ## Example Usage
//!
//! ```
//! use countkit::ds::CountBuckets;
//! use countkit::error::InvariantError;
//!
//! let mut store = CountBuckets::new();
//! store.increment("a");
//! store.increment("a");
//!
//! let checked: Result<(), InvariantError> = store.check_invariants();
//! assert!(checked.is_ok());
//! ```

use std::fmt;

/// Error returned when a store's internal invariants are violated.
///
/// Carries a human-readable description of which invariant failed, e.g. a
/// bucket sequence that is not strictly ascending or a key record whose count
/// disagrees with its bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("bucket counts not ascending");
        assert_eq!(err.to_string(), "bucket counts not ascending");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("empty bucket");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("empty bucket"));
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("stale handle");
        assert_eq!(err.message(), "stale handle");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
