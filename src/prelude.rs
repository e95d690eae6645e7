pub use crate::builder::{Counter, CounterBuilder, CounterKind};
pub use crate::counter::{OrderedCounter, ScanCounter};
pub use crate::ds::{CountBuckets, DEFAULT_BUCKET_PREALLOC};
pub use crate::error::InvariantError;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CounterMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::traits::{CountedKeys, StrCountedKeys};
