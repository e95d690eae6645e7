use crate::metrics::metrics_impl::CounterMetrics;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterMetricsSnapshot {
    pub increment_calls: u64,
    pub increment_new: u64,
    pub increment_saturated: u64,

    pub decrement_calls: u64,
    pub decrement_missing: u64,
    pub decrement_removed: u64,

    pub clear_calls: u64,

    pub buckets_created: u64,
    pub buckets_removed: u64,

    pub max_key_calls: u64,
    pub min_key_calls: u64,
    pub scan_steps: u64, // keys/buckets visited by extremal queries

    // gauges captured at snapshot time
    pub live_keys: usize,
    pub distinct_counts: usize,
}

impl CounterMetricsSnapshot {
    /// Copies the counters out of `metrics` and attaches the gauges.
    pub fn capture(metrics: &CounterMetrics, live_keys: usize, distinct_counts: usize) -> Self {
        Self {
            increment_calls: metrics.increment_calls,
            increment_new: metrics.increment_new,
            increment_saturated: metrics.increment_saturated,
            decrement_calls: metrics.decrement_calls,
            decrement_missing: metrics.decrement_missing,
            decrement_removed: metrics.decrement_removed,
            clear_calls: metrics.clear_calls,
            buckets_created: metrics.buckets_created,
            buckets_removed: metrics.buckets_removed,
            max_key_calls: metrics.max_key_calls.get(),
            min_key_calls: metrics.min_key_calls.get(),
            scan_steps: metrics.scan_steps.get(),
            live_keys,
            distinct_counts,
        }
    }
}
