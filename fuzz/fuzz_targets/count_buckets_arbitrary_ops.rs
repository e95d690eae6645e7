#![no_main]

use countkit::ds::CountBuckets;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on CountBuckets
//
// Random increment, decrement, query, batch and clear sequences; the full
// structural check runs after every step.
fuzz_target!(|data: &[u8]| {
    let mut store: CountBuckets<u8> = CountBuckets::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 8;
        let key = pair[1] % 32;

        match op {
            0 | 1 | 2 => {
                let before = store.count(&key).unwrap_or(0);
                let after = store.increment(key);
                assert_eq!(after, before.saturating_add(1));
            }
            3 | 4 => {
                let before = store.count(&key);
                let after = store.decrement(&key);
                assert_eq!(after, before.map(|c| c - 1));
                if after == Some(0) {
                    assert!(!store.contains(&key));
                }
            }
            5 => {
                if let Some((key, count)) = store.peek_max() {
                    assert_eq!(store.count(key), Some(count));
                    assert_eq!(store.max_count(), Some(count));
                }
                if let Some((key, count)) = store.peek_min() {
                    assert_eq!(store.count(key), Some(count));
                    assert_eq!(store.min_count(), Some(count));
                }
            }
            6 => {
                let keys = [key, key.wrapping_add(1) % 32, key];
                if pair[0] & 0x80 == 0 {
                    store.increment_batch(keys);
                } else {
                    store.decrement_batch(keys);
                }
            }
            7 => {
                if pair[1] == 0 {
                    store.clear();
                    assert!(store.is_empty());
                    assert_eq!(store.max_key(), None);
                }
            }
            _ => unreachable!(),
        }

        if let Err(err) = store.check_invariants() {
            panic!("{err}");
        }
        assert_eq!(store.iter().count(), store.len());
    }
});
