//! Binary trace record layout.
//!
//! Each record is a fixed 48-byte little-endian structure:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 8 | instruction address |
//! | 8 | 1 | op class (0=ALU, 1=LD, 2=ST, 3=CBR, 4=OTHER) |
//! | 9 | 1 | destination register |
//! | 10 | 1 | destination used |
//! | 11 | 1 | source register 1 |
//! | 12 | 1 | source register 2 |
//! | 13 | 1 | source 1 used |
//! | 14 | 1 | source 2 used |
//! | 15 | 1 | condition-code read |
//! | 16 | 1 | condition-code write |
//! | 24 | 8 | memory address |
//! | 32 | 1 | memory write |
//! | 33 | 1 | memory read |
//! | 34 | 1 | branch taken |
//! | 40 | 8 | branch target |
//!
//! Bytes 17..24 and 35..40 are padding and are ignored on decode and zeroed on encode.

use crate::common::constants::TRACE_RECORD_SIZE;
use crate::common::error::DecodeError;

use super::instruction::{BranchOutcome, Instruction, MemAccess, OpClass};

const INST_ADDR: usize = 0;
const OP_TYPE: usize = 8;
const DEST: usize = 9;
const DEST_NEEDED: usize = 10;
const SRC1_REG: usize = 11;
const SRC2_REG: usize = 12;
const SRC1_NEEDED: usize = 13;
const SRC2_NEEDED: usize = 14;
const CC_READ: usize = 15;
const CC_WRITE: usize = 16;
const MEM_ADDR: usize = 24;
const MEM_WRITE: usize = 32;
const MEM_READ: usize = 33;
const BR_DIR: usize = 34;
const BR_TARGET: usize = 40;

/// One raw record.
pub type RawRecord = [u8; TRACE_RECORD_SIZE];

fn read_u64(raw: &RawRecord, at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw[at..at + 8]);
    u64::from_le_bytes(bytes)
}

fn write_u64(raw: &mut RawRecord, at: usize, value: u64) {
    raw[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

const fn flag(raw: &RawRecord, at: usize) -> bool {
    raw[at] != 0
}

const fn reg_if(raw: &RawRecord, used: usize, reg: usize) -> Option<u8> {
    if flag(raw, used) { Some(raw[reg]) } else { None }
}

/// Decodes record number `index` (used only for error reporting).
///
/// # Errors
///
/// Returns [`DecodeError::InvalidOpClass`] if the op class byte is out of range.
pub fn decode(raw: &RawRecord, index: u64) -> Result<Instruction, DecodeError> {
    let op = OpClass::from_raw(raw[OP_TYPE]).ok_or(DecodeError::InvalidOpClass {
        record: index,
        value: raw[OP_TYPE],
    })?;

    let mem_read = flag(raw, MEM_READ);
    let mem_write = flag(raw, MEM_WRITE);
    let mem = (mem_read || mem_write).then(|| MemAccess {
        addr: read_u64(raw, MEM_ADDR),
        read: mem_read,
        write: mem_write,
    });

    let branch = (op == OpClass::Branch).then(|| BranchOutcome {
        taken: flag(raw, BR_DIR),
        target: read_u64(raw, BR_TARGET),
    });

    Ok(Instruction {
        pc: read_u64(raw, INST_ADDR),
        op,
        dest: reg_if(raw, DEST_NEEDED, DEST),
        src1: reg_if(raw, SRC1_NEEDED, SRC1_REG),
        src2: reg_if(raw, SRC2_NEEDED, SRC2_REG),
        src3: None,
        cc_read: flag(raw, CC_READ),
        cc_write: flag(raw, CC_WRITE),
        mem,
        branch,
    })
}

/// Encodes an instruction into a raw record.
pub fn encode(inst: &Instruction) -> RawRecord {
    let mut raw = [0u8; TRACE_RECORD_SIZE];
    write_u64(&mut raw, INST_ADDR, inst.pc);
    raw[OP_TYPE] = inst.op.raw();

    let mut put_reg = |used: usize, reg: usize, value: Option<u8>| {
        if let Some(r) = value {
            raw[used] = 1;
            raw[reg] = r;
        }
    };
    put_reg(DEST_NEEDED, DEST, inst.dest);
    put_reg(SRC1_NEEDED, SRC1_REG, inst.src1);
    put_reg(SRC2_NEEDED, SRC2_REG, inst.src2);

    raw[CC_READ] = u8::from(inst.cc_read);
    raw[CC_WRITE] = u8::from(inst.cc_write);

    if let Some(mem) = inst.mem {
        write_u64(&mut raw, MEM_ADDR, mem.addr);
        raw[MEM_READ] = u8::from(mem.read);
        raw[MEM_WRITE] = u8::from(mem.write);
    }
    if let Some(br) = inst.branch {
        raw[BR_DIR] = u8::from(br.taken);
        write_u64(&mut raw, BR_TARGET, br.target);
    }
    raw
}
