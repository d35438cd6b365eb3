//! # Hazard Detection Tests
//!
//! Exercises operand enumeration, producer search, and the stall policy
//! directly on hand-built slots.

use crate::common::harness::{EXE_FWD, FULL_FWD, MEM_FWD, NO_FWD};
use pipesim_core::config::ForwardingConfig;
use pipesim_core::core::pipeline::{Stage, ThirdSource};
use pipesim_core::core::pipeline::hazards::{
    Operand, Producer, dependency_stalls, must_stall, operands, youngest_producer,
};
use pipesim_core::core::pipeline::latches::Slot;
use pipesim_core::trace::Instruction;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn writer(op_id: u64, reg: u8) -> Slot {
    Slot::new(op_id, Instruction::alu(0).with_dest(reg))
}

fn reader(op_id: u64, reg: u8) -> Slot {
    Slot::new(op_id, Instruction::alu(0).with_srcs(Some(reg), None))
}

fn producer(stage: Stage, is_load: bool) -> Producer {
    Producer {
        stage,
        op_id: 0,
        is_load,
    }
}

#[test]
fn operands_in_source_order() {
    let inst = Instruction::branch(0, true, 0)
        .with_srcs(Some(4), Some(7))
        .with_cc(true, false);
    let ops: Vec<Operand> = operands(&inst).collect();
    assert_eq!(
        ops,
        vec![Operand::Reg(4), Operand::Reg(7), Operand::ConditionCodes]
    );
    assert_eq!(operands(&Instruction::alu(0)).count(), 0);
}

#[test]
fn third_source_fills_unused_slots() {
    let inst = Instruction::alu(0)
        .with_srcs(Some(4), None)
        .with_third_source(9);
    let ops: Vec<Operand> = operands(&inst).collect();
    assert_eq!(ops, vec![Operand::Reg(4), Operand::Reg(9), Operand::Reg(9)]);

    let consumer = Slot::new(2, inst);
    let producer = writer(1, 9);
    assert!(must_stall(&consumer, [(Stage::Ex, &producer)], NO_FWD));
    assert!(!must_stall(&consumer, [(Stage::Ex, &producer)], FULL_FWD));
}

#[test]
fn fetch_marks_every_fifth_alu_op() {
    let mut third = ThirdSource::default();
    let stream = [
        Instruction::alu(0),
        Instruction::load(0, 0x8000).with_dest(6),
        Instruction::alu(0).with_dest(1),
        Instruction::alu(0),
        Instruction::branch(0, true, 0),
        Instruction::alu(0),
        Instruction::alu(0).with_srcs(Some(2), Some(3)),
        Instruction::alu(0),
    ];
    let fetched: Vec<Instruction> = stream
        .into_iter()
        .map(|mut inst| {
            third.apply(&mut inst);
            inst
        })
        .collect();

    // ALU ops 1 to 4 are untouched; the fifth reads r1 and keeps its own sources.
    assert!(fetched[..6].iter().all(|i| i.src3.is_none()));
    assert_eq!(fetched[6].src3, Some(1));
    assert_eq!((fetched[6].src1, fetched[6].src2), (Some(2), Some(3)));
    assert_eq!(fetched[7].src3, None);
}

#[test]
fn fetch_replaces_a_recorded_third_source() {
    let mut third = ThirdSource::default();
    let mut inst = Instruction::load(0, 0x8000);
    inst.src3 = Some(5);
    third.apply(&mut inst);
    assert_eq!(inst.src3, None);
}

#[test]
fn written_by_matches_destination_and_cc() {
    let inst = Instruction::alu(0).with_dest(3).with_cc(false, true);
    assert!(Operand::Reg(3).written_by(&inst));
    assert!(!Operand::Reg(4).written_by(&inst));
    assert!(Operand::ConditionCodes.written_by(&inst));
    assert!(!Operand::ConditionCodes.written_by(&Instruction::alu(0)));
}

#[test]
fn youngest_older_writer_wins() {
    let old = writer(1, 5);
    let young = writer(3, 5);
    let other = writer(4, 6);
    let after = writer(9, 5);
    let candidates = [
        (Stage::Ma, &old),
        (Stage::Ex, &young),
        (Stage::Ex, &other),
        (Stage::Id, &after),
    ];

    let found = youngest_producer(6, Operand::Reg(5), candidates);
    assert_eq!(
        found,
        Some(Producer {
            stage: Stage::Ex,
            op_id: 3,
            is_load: false,
        })
    );
}

#[test]
fn no_producer_for_unwritten_operand() {
    let w = writer(0, 1);
    assert_eq!(
        youngest_producer(1, Operand::Reg(2), [(Stage::Ex, &w)]),
        None
    );
    assert_eq!(
        youngest_producer(1, Operand::ConditionCodes, [(Stage::Ex, &w)]),
        None
    );
}

#[rstest]
#[case::decode_always(Stage::Id, false, FULL_FWD, true)]
#[case::execute_forwarded(Stage::Ex, false, EXE_FWD, false)]
#[case::execute_unforwarded(Stage::Ex, false, MEM_FWD, true)]
#[case::execute_load(Stage::Ex, true, FULL_FWD, true)]
#[case::memory_forwarded(Stage::Ma, false, MEM_FWD, false)]
#[case::memory_load_forwarded(Stage::Ma, true, MEM_FWD, false)]
#[case::memory_unforwarded(Stage::Ma, true, EXE_FWD, true)]
#[case::memory_no_paths(Stage::Ma, false, NO_FWD, true)]
fn stall_policy(
    #[case] stage: Stage,
    #[case] is_load: bool,
    #[case] fwd: ForwardingConfig,
    #[case] stalls: bool,
) {
    assert_eq!(dependency_stalls(&producer(stage, is_load), fwd), stalls);
}

#[test]
fn must_stall_checks_every_operand() {
    let a = writer(0, 1);
    let b = writer(1, 2);
    let consumer = Slot::new(2, Instruction::alu(0).with_srcs(Some(2), Some(1)));
    let in_flight = [(Stage::Ma, &a), (Stage::Ex, &b)];

    // r2 comes from Execute, r1 from Memory.
    assert!(!must_stall(&consumer, in_flight, FULL_FWD));
    assert!(must_stall(&consumer, in_flight, EXE_FWD));
    assert!(must_stall(&consumer, in_flight, MEM_FWD));
}

#[test]
fn instruction_never_depends_on_itself() {
    let slot = Slot::new(
        4,
        Instruction::alu(0).with_dest(1).with_srcs(Some(1), None),
    );
    assert!(!must_stall(&slot, [(Stage::Id, &slot)], NO_FWD));
    assert!(!must_stall(&reader(0, 1), [(Stage::Ex, &writer(5, 1))], NO_FWD));
}
