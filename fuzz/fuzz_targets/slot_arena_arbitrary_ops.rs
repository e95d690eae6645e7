#![no_main]

use countkit::ds::SlotArena;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on SlotArena
//
// Random insert, remove, get_mut, shrink_to_fit and clear sequences. Vacant
// slots must never be visible and live slots must keep their values.
fuzz_target!(|data: &[u8]| {
    let mut arena: SlotArena<u32> = SlotArena::new();
    let mut live = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 6;
        let value = u32::from(pair[1]);

        match op {
            0 | 1 => {
                let id = arena.insert(value);
                assert_eq!(arena.get(id), Some(&value));
                live.push((id, value));
            }
            2 => {
                if !live.is_empty() {
                    let (id, expected) = live.swap_remove(value as usize % live.len());
                    assert_eq!(arena.remove(id), Some(expected));
                    assert!(!arena.contains(id));
                }
            }
            3 => {
                if !live.is_empty() {
                    let slot = value as usize % live.len();
                    let id = live[slot].0;
                    if let Some(stored) = arena.get_mut(id) {
                        *stored = value.wrapping_add(1);
                    }
                    live[slot].1 = value.wrapping_add(1);
                }
            }
            4 => {
                arena.shrink_to_fit();
            }
            5 => {
                arena.clear();
                live.clear();
            }
            _ => unreachable!(),
        }

        assert_eq!(arena.len(), live.len());
        assert_eq!(arena.iter().count(), live.len());
        for &(id, expected) in &live {
            assert_eq!(arena.get(id), Some(&expected));
        }
    }
});
