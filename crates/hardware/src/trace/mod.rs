//! Instruction trace input.
//!
//! This module supplies the dynamic instruction stream the pipeline consumes. It provides:
//! 1. **Model:** `Instruction` and its operation class, memory, and branch attributes.
//! 2. **Format:** The fixed 48-byte binary record layout.
//! 3. **Sources:** A streaming file reader (raw or gzip) and an in-memory trace.
//! 4. **Encoding:** A writer for producing trace files.

use std::collections::VecDeque;

use crate::common::error::DecodeError;

/// Decoded instruction types.
pub mod instruction;

/// Binary record layout and codec.
pub mod record;

/// Streaming file reader.
pub mod reader;

/// Trace file writer.
pub mod writer;

pub use instruction::{BranchOutcome, Instruction, MemAccess, OpClass};
pub use reader::{FileTrace, TraceReader};
pub use writer::{TraceWriter, write_trace_file};

/// A forward-only supplier of decoded instructions.
///
/// `Ok(None)` marks the end of the trace.
pub trait InstructionSource {
    /// Returns the next instruction in program order.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the underlying data is malformed.
    fn next_instruction(&mut self) -> Result<Option<Instruction>, DecodeError>;
}

impl<S: InstructionSource + ?Sized> InstructionSource for Box<S> {
    fn next_instruction(&mut self) -> Result<Option<Instruction>, DecodeError> {
        (**self).next_instruction()
    }
}

/// An instruction trace held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrace {
    insts: VecDeque<Instruction>,
}

impl MemoryTrace {
    /// Creates a trace from instructions in program order.
    pub fn new(insts: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            insts: insts.into_iter().collect(),
        }
    }

    /// Instructions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.insts.len()
    }
}

impl From<Vec<Instruction>> for MemoryTrace {
    fn from(insts: Vec<Instruction>) -> Self {
        Self {
            insts: insts.into(),
        }
    }
}

impl FromIterator<Instruction> for MemoryTrace {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl InstructionSource for MemoryTrace {
    fn next_instruction(&mut self) -> Result<Option<Instruction>, DecodeError> {
        Ok(self.insts.pop_front())
    }
}
