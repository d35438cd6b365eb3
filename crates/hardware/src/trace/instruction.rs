//! Decoded instruction representation.
//!
//! A trace record carries no opcode bits, only the information the timing
//! model needs: the operation class, register dependencies, condition-code
//! usage, the memory address for loads and stores, and the resolved outcome
//! of branches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse operation class of a traced instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OpClass {
    /// Integer arithmetic (add, sub, mul, div, ...).
    Alu,
    /// Memory load.
    Load,
    /// Memory store.
    Store,
    /// Conditional branch.
    Branch,
    /// Anything else.
    Other,
}

impl OpClass {
    /// Every class, in encoding order.
    pub const ALL: [Self; 5] = [
        Self::Alu,
        Self::Load,
        Self::Store,
        Self::Branch,
        Self::Other,
    ];

    /// Decodes the raw trace byte.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Alu),
            1 => Some(Self::Load),
            2 => Some(Self::Store),
            3 => Some(Self::Branch),
            4 => Some(Self::Other),
            _ => None,
        }
    }

    /// The raw trace byte for this class.
    pub const fn raw(self) -> u8 {
        match self {
            Self::Alu => 0,
            Self::Load => 1,
            Self::Store => 2,
            Self::Branch => 3,
            Self::Other => 4,
        }
    }

    /// Short lowercase mnemonic used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alu => "alu",
            Self::Load => "ld",
            Self::Store => "st",
            Self::Branch => "cbr",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data memory reference of a load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemAccess {
    /// Effective address.
    pub addr: u64,
    /// The instruction reads memory.
    pub read: bool,
    /// The instruction writes memory.
    pub write: bool,
}

/// Resolved outcome of a branch, as recorded in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchOutcome {
    /// The branch was taken.
    pub taken: bool,
    /// Taken-path target address.
    pub target: u64,
}

impl BranchOutcome {
    /// The target only if the branch was taken.
    pub const fn taken_target(self) -> Option<u64> {
        if self.taken { Some(self.target) } else { None }
    }
}

/// One dynamic instruction from the trace. Immutable once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Instruction {
    /// Instruction address.
    pub pc: u64,
    /// Operation class.
    pub op: OpClass,
    /// Destination register, if written.
    pub dest: Option<u8>,
    /// First source register, if read.
    pub src1: Option<u8>,
    /// Second source register, if read.
    pub src2: Option<u8>,
    /// Third source register. Never stored in a trace record; the fetch stage
    /// assigns it to every fifth ALU op.
    #[serde(default)]
    pub src3: Option<u8>,
    /// Reads the condition-code register.
    pub cc_read: bool,
    /// Writes the condition-code register.
    pub cc_write: bool,
    /// Data memory reference.
    pub mem: Option<MemAccess>,
    /// Branch outcome; present exactly when `op` is [`OpClass::Branch`].
    pub branch: Option<BranchOutcome>,
}

impl Instruction {
    /// An instruction of class `op` at `pc` with no operands.
    pub const fn new(pc: u64, op: OpClass) -> Self {
        Self {
            pc,
            op,
            dest: None,
            src1: None,
            src2: None,
            src3: None,
            cc_read: false,
            cc_write: false,
            mem: None,
            branch: None,
        }
    }

    /// An ALU instruction at `pc`.
    pub const fn alu(pc: u64) -> Self {
        Self::new(pc, OpClass::Alu)
    }

    /// A load from `addr` at `pc`.
    pub const fn load(pc: u64, addr: u64) -> Self {
        let mut inst = Self::new(pc, OpClass::Load);
        inst.mem = Some(MemAccess {
            addr,
            read: true,
            write: false,
        });
        inst
    }

    /// A store to `addr` at `pc`.
    pub const fn store(pc: u64, addr: u64) -> Self {
        let mut inst = Self::new(pc, OpClass::Store);
        inst.mem = Some(MemAccess {
            addr,
            read: false,
            write: true,
        });
        inst
    }

    /// A conditional branch at `pc` with its resolved outcome.
    pub const fn branch(pc: u64, taken: bool, target: u64) -> Self {
        let mut inst = Self::new(pc, OpClass::Branch);
        inst.branch = Some(BranchOutcome { taken, target });
        inst
    }

    /// Sets the destination register.
    #[must_use]
    pub const fn with_dest(mut self, reg: u8) -> Self {
        self.dest = Some(reg);
        self
    }

    /// Sets the source registers.
    #[must_use]
    pub const fn with_srcs(mut self, src1: Option<u8>, src2: Option<u8>) -> Self {
        self.src1 = src1;
        self.src2 = src2;
        self
    }

    /// Turns the instruction into a three-source op reading `reg`.
    ///
    /// `reg` also fills whichever of the first two source slots is unused.
    #[must_use]
    pub const fn with_third_source(mut self, reg: u8) -> Self {
        self.src3 = Some(reg);
        if self.src1.is_none() {
            self.src1 = Some(reg);
        }
        if self.src2.is_none() {
            self.src2 = Some(reg);
        }
        self
    }

    /// Marks the instruction as reading and/or writing the condition codes.
    #[must_use]
    pub const fn with_cc(mut self, read: bool, write: bool) -> Self {
        self.cc_read = read;
        self.cc_write = write;
        self
    }

    /// True for conditional branches.
    pub const fn is_branch(&self) -> bool {
        matches!(self.op, OpClass::Branch)
    }

    /// True for loads, whose result is not ready until the Memory stage.
    pub const fn is_load(&self) -> bool {
        matches!(self.op, OpClass::Load)
    }
}
