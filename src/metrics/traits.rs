//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and exporting are split into small traits so the
//! stores only ever write counters and never know who reads them.
//!
//! ```text
//!        ┌─────────────────────────────┐      ┌──────────────────────────────┐
//!        │   CounterMetricsRecorder    │      │  CounterMetricsReadRecorder  │
//!        │  increment/decrement/clear  │      │  max_key/min_key/scan_step   │
//!        │  (&mut self)                │      │  (&self, interior counters)  │
//!        └──────────────┬──────────────┘      └──────────────────────────────┘
//!                       │
//!                       ▼
//!        ┌─────────────────────────────┐
//!        │    BucketMetricsRecorder    │
//!        │  bucket_created/removed     │
//!        └─────────────────────────────┘
//!
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (monitoring)                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters shared by every counted-key store.
pub trait CounterMetricsRecorder {
    fn record_increment_new(&mut self);
    fn record_increment_existing(&mut self);
    fn record_increment_saturated(&mut self);
    fn record_decrement_missing(&mut self);
    fn record_decrement_existing(&mut self);
    fn record_decrement_removed(&mut self);
    fn record_clear(&mut self);
}

/// Bucket churn for the bucket-list store.
pub trait BucketMetricsRecorder: CounterMetricsRecorder {
    fn record_bucket_created(&mut self);
    fn record_bucket_removed(&mut self);
}

/// Read-path counters for `&self` methods (interior mutability).
pub trait CounterMetricsReadRecorder {
    fn record_max_key_call(&self);
    fn record_min_key_call(&self);
    /// One key or bucket visited while answering an extremal query.
    fn record_scan_step(&self);
}

/// Produces a point-in-time copy of a store's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes a snapshot to an external sink.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
