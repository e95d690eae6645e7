use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    BucketMetricsRecorder, CounterMetricsReadRecorder, CounterMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct CounterMetrics {
    pub increment_calls: u64,
    pub increment_new: u64,
    pub increment_saturated: u64,
    pub decrement_calls: u64,
    pub decrement_missing: u64,
    pub decrement_removed: u64,
    pub clear_calls: u64,
    pub buckets_created: u64,
    pub buckets_removed: u64,
    pub max_key_calls: MetricsCell,
    pub min_key_calls: MetricsCell,
    pub scan_steps: MetricsCell,
}

impl CounterMetrics {
    pub fn reset(&mut self) {
        self.increment_calls = 0;
        self.increment_new = 0;
        self.increment_saturated = 0;
        self.decrement_calls = 0;
        self.decrement_missing = 0;
        self.decrement_removed = 0;
        self.clear_calls = 0;
        self.buckets_created = 0;
        self.buckets_removed = 0;
        self.max_key_calls.reset();
        self.min_key_calls.reset();
        self.scan_steps.reset();
    }
}

impl CounterMetricsRecorder for CounterMetrics {
    fn record_increment_new(&mut self) {
        self.increment_calls += 1;
        self.increment_new += 1;
    }

    fn record_increment_existing(&mut self) {
        self.increment_calls += 1;
    }

    fn record_increment_saturated(&mut self) {
        self.increment_calls += 1;
        self.increment_saturated += 1;
    }

    fn record_decrement_missing(&mut self) {
        self.decrement_calls += 1;
        self.decrement_missing += 1;
    }

    fn record_decrement_existing(&mut self) {
        self.decrement_calls += 1;
    }

    fn record_decrement_removed(&mut self) {
        self.decrement_calls += 1;
        self.decrement_removed += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl BucketMetricsRecorder for CounterMetrics {
    fn record_bucket_created(&mut self) {
        self.buckets_created += 1;
    }

    fn record_bucket_removed(&mut self) {
        self.buckets_removed += 1;
    }
}

impl CounterMetricsReadRecorder for &CounterMetrics {
    fn record_max_key_call(&self) {
        self.max_key_calls.incr();
    }

    fn record_min_key_call(&self) {
        self.min_key_calls.incr();
    }

    fn record_scan_step(&self) {
        self.scan_steps.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_paths_share_call_counter() {
        let mut m = CounterMetrics::default();
        m.record_increment_new();
        m.record_increment_existing();
        m.record_increment_saturated();
        assert_eq!(m.increment_calls, 3);
        assert_eq!(m.increment_new, 1);
        assert_eq!(m.increment_saturated, 1);
    }

    #[test]
    fn decrement_paths_share_call_counter() {
        let mut m = CounterMetrics::default();
        m.record_decrement_missing();
        m.record_decrement_existing();
        m.record_decrement_removed();
        assert_eq!(m.decrement_calls, 3);
        assert_eq!(m.decrement_missing, 1);
        assert_eq!(m.decrement_removed, 1);
    }

    #[test]
    fn read_recorder_works_through_shared_ref() {
        let m = CounterMetrics::default();
        (&m).record_max_key_call();
        (&m).record_min_key_call();
        (&m).record_scan_step();
        (&m).record_scan_step();
        assert_eq!(m.max_key_calls.get(), 1);
        assert_eq!(m.min_key_calls.get(), 1);
        assert_eq!(m.scan_steps.get(), 2);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut m = CounterMetrics::default();
        m.record_bucket_created();
        m.record_clear();
        (&m).record_scan_step();
        (&m).record_max_key_call();
        (&m).record_min_key_call();
        m.reset();
        assert_eq!(m.buckets_created, 0);
        assert_eq!(m.clear_calls, 0);
        assert_eq!(m.scan_steps.get(), 0);
        assert_eq!(m.max_key_calls.get(), 0);
        assert_eq!(m.min_key_calls.get(), 0);
    }
}
