//! Opt-in operation counters for the counted-key stores.
//!
//! Compiled only with the `metrics` feature. Stores record into a
//! [`CounterMetrics`](metrics_impl::CounterMetrics) on every operation and
//! expose a [`CounterMetricsSnapshot`](snapshot::CounterMetricsSnapshot)
//! through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
