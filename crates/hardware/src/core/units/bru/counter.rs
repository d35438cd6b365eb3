//! Two-bit saturating counters and global history.

/// A 2-bit saturating direction counter.
///
/// States 0 and 1 predict not-taken, 2 and 3 predict taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatCounter(u8);

impl SatCounter {
    const MAX: u8 = 3;

    /// Initial state of every table entry.
    pub const WEAKLY_NOT_TAKEN: Self = Self(1);

    /// Current counter value, `0..=3`.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Predicted direction.
    pub const fn taken(self) -> bool {
        self.0 >= 2
    }

    /// Moves one step toward the observed outcome.
    pub const fn train(&mut self, taken: bool) {
        if taken {
            if self.0 < Self::MAX {
                self.0 += 1;
            }
        } else if self.0 > 0 {
            self.0 -= 1;
        }
    }
}

impl Default for SatCounter {
    fn default() -> Self {
        Self::WEAKLY_NOT_TAKEN
    }
}

/// A table of `2^bits` counters indexed by a masked hash.
#[derive(Debug, Clone)]
pub struct CounterTable {
    counters: Vec<SatCounter>,
    mask: u64,
}

impl CounterTable {
    /// Creates a table of `1 << bits` weakly-not-taken counters.
    pub fn new(bits: usize) -> Self {
        let size = 1usize << bits;
        Self {
            counters: vec![SatCounter::WEAKLY_NOT_TAKEN; size],
            mask: (size as u64) - 1,
        }
    }

    fn slot(&self, index: u64) -> usize {
        // Masked to the table size, which always fits in usize.
        (index & self.mask) as usize
    }

    /// The counter selected by `index` (masked to the table size).
    pub fn get(&self, index: u64) -> SatCounter {
        self.counters[self.slot(index)]
    }

    /// Trains the counter selected by `index`.
    pub fn train(&mut self, index: u64, taken: bool) {
        let slot = self.slot(index);
        self.counters[slot].train(taken);
    }

    /// Number of counters.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Always false; tables hold at least two counters.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Global branch history register of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct GlobalHistory {
    bits: u64,
    mask: u64,
}

impl GlobalHistory {
    /// An all-not-taken history of `len` outcomes.
    pub const fn new(len: usize) -> Self {
        Self {
            bits: 0,
            mask: (1u64 << len) - 1,
        }
    }

    /// The most recent outcomes, newest in bit 0.
    pub const fn value(self) -> u64 {
        self.bits
    }

    /// Shifts in a resolved outcome.
    pub const fn push(&mut self, taken: bool) {
        self.bits = ((self.bits << 1) | taken as u64) & self.mask;
    }
}

/// Drops the instruction alignment bits from a PC before table indexing.
pub const fn pc_index(pc: u64) -> u64 {
    pc >> 2
}
