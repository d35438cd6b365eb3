//! Data Hazard Detection.
//!
//! This module decides whether an instruction in Decode can issue this cycle. It provides:
//! 1. **Operand Enumeration:** The register and condition-code values an instruction reads.
//! 2. **Producer Search:** The youngest older in-flight instruction writing each operand.
//! 3. **Stall Policy:** Whether that producer's result can reach Decode in time, given the
//!    configured forwarding paths.

use crate::config::ForwardingConfig;
use crate::core::pipeline::latches::{Slot, Stage};
use crate::trace::Instruction;

/// A value an instruction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A general-purpose register.
    Reg(u8),
    /// The condition-code register.
    ConditionCodes,
}

impl Operand {
    /// Whether `inst` writes this operand.
    pub const fn written_by(self, inst: &Instruction) -> bool {
        match self {
            Self::Reg(r) => matches!(inst.dest, Some(d) if d == r),
            Self::ConditionCodes => inst.cc_write,
        }
    }
}

/// Operands read by `inst`, in source order.
pub fn operands(inst: &Instruction) -> impl Iterator<Item = Operand> {
    [
        inst.src1.map(Operand::Reg),
        inst.src2.map(Operand::Reg),
        inst.src3.map(Operand::Reg),
        inst.cc_read.then_some(Operand::ConditionCodes),
    ]
    .into_iter()
    .flatten()
}

/// The in-flight instruction a consumer depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Producer {
    /// Latch currently holding the producer.
    pub stage: Stage,
    /// Producer's sequence number.
    pub op_id: u64,
    /// Producer is a load; its value is not available until after Memory.
    pub is_load: bool,
}

/// Finds the youngest instruction older than `consumer` that writes `operand`.
///
/// `candidates` pairs each in-flight slot with the latch holding it.
pub fn youngest_producer<'a>(
    consumer: u64,
    operand: Operand,
    candidates: impl IntoIterator<Item = (Stage, &'a Slot)>,
) -> Option<Producer> {
    candidates
        .into_iter()
        .filter(|(_, slot)| slot.op_id < consumer && operand.written_by(&slot.inst))
        .max_by_key(|(_, slot)| slot.op_id)
        .map(|(stage, slot)| Producer {
            stage,
            op_id: slot.op_id,
            is_load: slot.inst.is_load(),
        })
}

/// Whether a dependency on `producer` forces the consumer to wait in Decode.
///
/// - Producer in Decode (older lane of the same bundle): always stalls.
/// - Producer in Execute: stalls for loads, or when execute forwarding is off.
/// - Producer in Memory: stalls when memory forwarding is off.
pub const fn dependency_stalls(producer: &Producer, forwarding: ForwardingConfig) -> bool {
    match producer.stage {
        Stage::Id => true,
        Stage::Ex => producer.is_load || !forwarding.execute,
        Stage::Ma => !forwarding.memory,
        // Nothing older than a decoding instruction waits behind it in Fetch.
        Stage::If => false,
    }
}

/// Whether `slot` in Decode must stall on any of its operands.
pub fn must_stall<'a, I>(slot: &Slot, in_flight: I, forwarding: ForwardingConfig) -> bool
where
    I: IntoIterator<Item = (Stage, &'a Slot)>,
    I::IntoIter: Clone,
{
    let in_flight = in_flight.into_iter();
    operands(&slot.inst).any(|operand| {
        youngest_producer(slot.op_id, operand, in_flight.clone())
            .is_some_and(|p| dependency_stalls(&p, forwarding))
    })
}
