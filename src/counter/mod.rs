//! Alternative [`CountedKeys`](crate::traits::CountedKeys) implementations.
//!
//! Both trade the O(1) extremal queries of
//! [`CountBuckets`](crate::ds::CountBuckets) for simpler bookkeeping; they
//! serve as baselines and as behavioural references in tests.

pub mod ordered;
pub mod scan;

pub use ordered::OrderedCounter;
pub use scan::ScanCounter;
