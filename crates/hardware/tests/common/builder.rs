//! Instruction trace builder.
//!
//! Assigns program counters the way a real trace would: sequential 4-byte
//! steps, jumping to the target after a taken branch.

use pipesim_core::trace::Instruction;

/// Address of the first instruction in every built trace.
pub const BASE_PC: u64 = 0x40_0000;

/// Fluent builder for instruction traces.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    next_pc: u64,
    insts: Vec<Instruction>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            next_pc: BASE_PC,
            insts: Vec::new(),
        }
    }

    /// Current fetch address; the PC the next pushed instruction receives.
    pub fn pc(&self) -> u64 {
        self.next_pc
    }

    /// Appends `inst` at the current PC and advances it.
    pub fn push(mut self, mut inst: Instruction) -> Self {
        inst.pc = self.next_pc;
        self.next_pc = match inst.branch {
            Some(br) if br.taken => br.target,
            _ => self.next_pc + 4,
        };
        self.insts.push(inst);
        self
    }

    /// An ALU op with optional destination and sources.
    pub fn alu(self, dest: Option<u8>, src1: Option<u8>, src2: Option<u8>) -> Self {
        let mut inst = Instruction::alu(0).with_srcs(src1, src2);
        inst.dest = dest;
        self.push(inst)
    }

    /// `n` ALU ops with no register operands.
    pub fn independent(mut self, n: usize) -> Self {
        for _ in 0..n {
            self = self.alu(None, None, None);
        }
        self
    }

    /// A load into `dest`, addressed through `base`.
    pub fn load(self, dest: u8, base: Option<u8>) -> Self {
        self.push(Instruction::load(0, 0x8000).with_dest(dest).with_srcs(base, None))
    }

    /// A store of `data` through `base`.
    pub fn store(self, data: Option<u8>, base: Option<u8>) -> Self {
        self.push(Instruction::store(0, 0x8000).with_srcs(data, base))
    }

    /// An ALU op that sets the condition codes.
    pub fn cc_writer(self) -> Self {
        self.push(Instruction::alu(0).with_cc(false, true))
    }

    /// A branch reading the condition codes.
    pub fn branch(self, taken: bool, target: u64) -> Self {
        self.push(Instruction::branch(0, taken, target).with_cc(true, false))
    }

    /// A branch with no operands, so it never waits on a hazard.
    pub fn plain_branch(self, taken: bool, target: u64) -> Self {
        self.push(Instruction::branch(0, taken, target))
    }

    /// A counted loop: `body` independent ALU ops closed by a backward branch,
    /// taken on every iteration but the last.
    pub fn counted_loop(mut self, iterations: usize, body: usize) -> Self {
        let head = self.next_pc;
        for i in 0..iterations {
            self = self.independent(body);
            self = self.plain_branch(i + 1 < iterations, head);
        }
        self
    }

    pub fn build(self) -> Vec<Instruction> {
        self.insts
    }
}
