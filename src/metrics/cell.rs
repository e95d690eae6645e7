use std::cell::Cell;

/// A counter that can be bumped through `&self`.
///
/// Used for read-only store operations (`max_key`, `min_key`) that cannot
/// take a mutable recorder. Not `Sync`; the stores are single-threaded.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.add(1);
    }

    #[inline]
    pub fn add(&self, n: u64) {
        self.0.set(self.0.get().saturating_add(n));
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_cell_counts_through_shared_ref() {
        let cell = MetricsCell::new();
        let shared = &cell;
        shared.incr();
        shared.add(4);
        assert_eq!(cell.get(), 5);
        cell.reset();
        assert_eq!(cell.get(), 0);
    }
}
