//! Branch Target Buffer (BTB).
//!
//! A direct-mapped, fully tagged table of taken-branch targets. A prediction of
//! "taken" is only useful if the BTB can also say where to.

use super::counter::pc_index;

#[derive(Debug, Clone, Copy, Default)]
struct BtbEntry {
    /// Full PC of the branch that owns this entry.
    tag: u64,
    target: u64,
    valid: bool,
}

/// Branch Target Buffer structure.
#[derive(Debug, Clone)]
pub struct Btb {
    table: Vec<BtbEntry>,
    mask: u64,
}

impl Btb {
    /// Creates an empty BTB with `size` entries. `size` must be a power of two.
    pub fn new(size: usize) -> Self {
        Self {
            table: vec![BtbEntry::default(); size],
            mask: (size as u64).saturating_sub(1),
        }
    }

    fn index(&self, pc: u64) -> usize {
        (pc_index(pc) & self.mask) as usize
    }

    /// Target of the branch at `pc`, if it has an entry.
    pub fn lookup(&self, pc: u64) -> Option<u64> {
        let e = self.table[self.index(pc)];
        (e.valid && e.tag == pc).then_some(e.target)
    }

    /// Installs or replaces the entry for `pc`.
    pub fn update(&mut self, pc: u64, target: u64) {
        let idx = self.index(pc);
        self.table[idx] = BtbEntry {
            tag: pc,
            target,
            valid: true,
        };
    }

    /// Number of entries.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }
}
