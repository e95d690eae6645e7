//! countkit: counted-key stores with O(1) max-key and min-key queries.
//!
//! [`CountBuckets`](ds::CountBuckets) is the bucket-list store;
//! [`ScanCounter`](counter::ScanCounter) and
//! [`OrderedCounter`](counter::OrderedCounter) implement the same
//! [`CountedKeys`](traits::CountedKeys) contract with simpler bookkeeping.

pub mod builder;
pub mod counter;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
