#![no_main]

use countkit::builder::{CounterBuilder, CounterKind};
use libfuzzer_sys::fuzz_target;

// Differential fuzzing across all counter kinds
//
// The scan, ordered and bucket-list counters must report identical counts,
// sizes and extremal counts for every prefix of the input.
fuzz_target!(|data: &[u8]| {
    let mut counters: Vec<_> = CounterKind::ALL
        .into_iter()
        .map(|kind| CounterBuilder::new(64).build::<u8>(kind))
        .collect();

    for &byte in data {
        let key = byte & 0x3f;
        let results: Vec<_> = if byte & 0x40 == 0 {
            counters.iter_mut().map(|c| Some(c.increment(key))).collect()
        } else {
            counters.iter_mut().map(|c| c.decrement(&key)).collect()
        };
        assert!(results.windows(2).all(|w| w[0] == w[1]), "{results:?}");

        let reference = &counters[0];
        for counter in &counters[1..] {
            assert_eq!(counter.len(), reference.len());
            assert_eq!(counter.count(&key), reference.count(&key));
            assert_eq!(counter.max_count(), reference.max_count());
            assert_eq!(counter.min_count(), reference.min_count());
        }
        for counter in &counters {
            if let Some(max) = counter.max_key() {
                assert_eq!(counter.count(max), counter.max_count());
            }
            if let Some(min) = counter.min_key() {
                assert_eq!(counter.count(min), counter.min_count());
            }
        }
    }
});
