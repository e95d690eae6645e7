use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::CounterMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for counter metrics snapshots.
///
/// Writes the Prometheus text exposition format so the output can be scraped
/// directly or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_metric("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<CounterMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CounterMetricsSnapshot) {
        self.write_counter("increment_calls_total", snapshot.increment_calls);
        self.write_counter("increment_new_total", snapshot.increment_new);
        self.write_counter("increment_saturated_total", snapshot.increment_saturated);
        self.write_counter("decrement_calls_total", snapshot.decrement_calls);
        self.write_counter("decrement_missing_total", snapshot.decrement_missing);
        self.write_counter("decrement_removed_total", snapshot.decrement_removed);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_counter("buckets_created_total", snapshot.buckets_created);
        self.write_counter("buckets_removed_total", snapshot.buckets_removed);
        self.write_counter("max_key_calls_total", snapshot.max_key_calls);
        self.write_counter("min_key_calls_total", snapshot.min_key_calls);
        self.write_counter("scan_steps_total", snapshot.scan_steps);
        self.write_gauge("live_keys", snapshot.live_keys as u64);
        self.write_gauge("distinct_counts", snapshot.distinct_counts as u64);
    }
}
