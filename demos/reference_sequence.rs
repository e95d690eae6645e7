use countkit::builder::{CounterBuilder, CounterKind};
use countkit::traits::StrCountedKeys;

enum Op {
    Inc(&'static str),
    Dec(&'static str),
}

const OPS: [Op; 9] = [
    Op::Inc("a"),
    Op::Inc("b"),
    Op::Inc("b"),
    Op::Inc("c"),
    Op::Inc("c"),
    Op::Inc("c"),
    Op::Dec("a"),
    Op::Dec("b"),
    Op::Dec("b"),
];

/// One `inc("a") min = "a" max = "a"` line per call.
fn trace(kind: CounterKind) -> Vec<String> {
    let mut counter = CounterBuilder::new(8).build::<String>(kind);
    OPS.iter()
        .map(|op| {
            let label = match op {
                Op::Inc(key) => {
                    counter.increment((*key).to_string());
                    format!("inc({key:?})")
                },
                Op::Dec(key) => {
                    counter.decrement(&(*key).to_string());
                    format!("dec({key:?})")
                },
            };
            format!(
                "{label} min = {:?} max = {:?}",
                counter.min_key_or_empty(),
                counter.max_key_or_empty()
            )
        })
        .collect()
}

fn main() {
    for kind in CounterKind::ALL {
        println!("== {kind:?} ==");
        for line in trace(kind) {
            println!("{line}");
        }
    }
}

// Expected output for Buckets (ties resolve to the key that reached the count
// first; Scan and Ordered may pick another key of the same count):
// inc("a") min = "a" max = "a"
// inc("b") min = "a" max = "a"
// inc("b") min = "a" max = "b"
// inc("c") min = "a" max = "b"
// inc("c") min = "a" max = "b"
// inc("c") min = "a" max = "c"
// dec("a") min = "b" max = "c"
// dec("b") min = "b" max = "c"
// dec("b") min = "c" max = "c"
