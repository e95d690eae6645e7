use countkit::builder::{CounterBuilder, CounterKind};
use countkit::metrics::exporter::PrometheusTextExporter;
use countkit::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};

fn main() {
    let text = "the quick brown fox jumps over the lazy dog the end";

    for kind in CounterKind::ALL {
        let mut counter = CounterBuilder::new(16).build::<&str>(kind);
        for word in text.split_whitespace() {
            counter.increment(word);
        }
        counter.decrement(&"end");
        let _ = counter.max_key();
        let _ = counter.min_key();

        let exporter = PrometheusTextExporter::new(
            format!("countkit_{}", format!("{kind:?}").to_lowercase()),
            Vec::new(),
        );
        exporter.export(&counter.snapshot());
        print!("{}", String::from_utf8_lossy(&exporter.into_inner()));
    }
}

// Run with: cargo run --example builder_metrics --features metrics
//
// The scan counter reports `scan_steps_total` proportional to the number of
// live keys; the ordered and bucket counters report zero.
