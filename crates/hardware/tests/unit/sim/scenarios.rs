//! # Run Scenarios
//!
//! Whole-trace runs whose cycle counts, branch statistics, and report lines
//! are known in advance.

use crate::common::builder::{BASE_PC, TraceBuilder};
use crate::common::harness::{FULL_FWD, NO_FWD, config, init_tracing, run, temp_trace};
use pipesim_core::Simulator;
use pipesim_core::config::BranchPredictor as Policy;
use pipesim_core::core::pipeline::latches::Prediction;
use pipesim_core::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use pipesim_core::trace::{Instruction, MemoryTrace};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn report_value(report: &str, key: &str) -> Option<String> {
    let wanted = format!("LAB2_{key}");
    report.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        (name.trim() == wanted).then(|| value.trim().to_string())
    })
}

/// 100 instructions with a single taken branch in the middle.
fn one_taken_branch() -> Vec<Instruction> {
    TraceBuilder::new()
        .independent(50)
        .plain_branch(true, BASE_PC + 0x1000)
        .independent(49)
        .build()
}

// ══════════════════════════════════════════════════════════
// 1. Baseline
// ══════════════════════════════════════════════════════════

#[test]
fn long_independent_run_approaches_unit_cpi() {
    init_tracing();
    let stats = run(
        config(1, FULL_FWD, None),
        TraceBuilder::new().independent(10_000).build(),
    );
    assert_eq!(stats.instructions_retired, 10_000);
    assert_eq!(stats.cycles, 10_004);

    let report = stats.report().to_string();
    assert_eq!(report_value(&report, "CPI").as_deref(), Some("1.000"));
    assert_eq!(report_value(&report, "MISPRED_RATE").as_deref(), Some("NaN"));
}

#[test]
fn branches_without_predictor_are_not_counted() {
    let stats = run(config(1, NO_FWD, None), one_taken_branch());
    assert_eq!(stats.instructions_retired, 100);
    assert_eq!(stats.inst_branch, 1);
    assert_eq!(stats.branches, 0);
    assert_eq!(stats.cycles, 104, "no predictor, no control penalty");
    assert_eq!(stats.finalize().mispred_rate, None);
}

// ══════════════════════════════════════════════════════════
// 2. Branch misprediction
// ══════════════════════════════════════════════════════════

#[test]
fn mispredicted_branch_costs_three_fetch_cycles() {
    let stats = run(
        config(1, FULL_FWD, Some(Policy::AlwaysNotTaken)),
        one_taken_branch(),
    );
    assert_eq!(stats.instructions_retired, 100);
    assert_eq!(stats.branches, 1);
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.stalls_control, 3);
    assert_eq!(stats.cycles, 107);
    assert_eq!(stats.finalize().mispred_rate, Some(1.0));
}

#[test]
fn correct_prediction_costs_nothing() {
    let trace = TraceBuilder::new()
        .independent(10)
        .plain_branch(false, BASE_PC + 0x1000)
        .independent(9)
        .build();
    let stats = run(config(1, FULL_FWD, Some(Policy::AlwaysNotTaken)), trace);
    assert_eq!(stats.branches, 1);
    assert_eq!(stats.branch_mispredictions, 0);
    assert_eq!(stats.cycles, 24);

    let report = stats.report().to_string();
    assert_eq!(report_value(&report, "MISPRED_RATE").as_deref(), Some("0.00000"));
}

#[test]
fn wide_fetch_squashes_every_lane() {
    // Width 2: the branch takes the first lane of its bundle, so the lane
    // beside it is squashed, then fetch stays blocked for three cycles of two
    // lanes each.
    let trace = TraceBuilder::new()
        .independent(2)
        .plain_branch(true, BASE_PC + 0x1000)
        .independent(5)
        .build();
    let stats = run(config(2, FULL_FWD, Some(Policy::AlwaysNotTaken)), trace);
    assert_eq!(stats.instructions_retired, 8);
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.stalls_control, 7);
}

// ══════════════════════════════════════════════════════════
// 3. Predictor policies on a loop
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::always_not_taken(Policy::AlwaysNotTaken, 99)]
#[case::always_taken(Policy::AlwaysTaken, 2)]
#[case::btfn(Policy::Btfn, 2)]
#[case::bimodal(Policy::Bimodal, 2)]
#[case::gshare(Policy::GShare, 16)]
#[case::tournament(Policy::Tournament, 6)]
fn loop_mispredictions_by_policy(#[case] policy: Policy, #[case] at_most: u64) {
    let trace = TraceBuilder::new().counted_loop(100, 3).build();
    let stats = run(config(1, FULL_FWD, Some(policy)), trace);

    assert_eq!(stats.instructions_retired, 400);
    assert_eq!(stats.branches, 100);
    assert!(
        stats.branch_mispredictions <= at_most,
        "{policy:?} mispredicted {} of 100",
        stats.branch_mispredictions
    );
    assert!(stats.branch_mispredictions >= 1, "the loop exit is never predicted");
    // Every mispredict blocks fetch for three cycles on a one-wide pipeline.
    assert_eq!(stats.stalls_control, 3 * stats.branch_mispredictions);
}

#[test]
fn static_loop_counts_are_exact() {
    let trace = TraceBuilder::new().counted_loop(100, 3).build();
    // The loop exit is the last instruction, so mispredicting it delays nothing.
    for (policy, expected, cycles) in [
        (Policy::AlwaysNotTaken, 99, 404 + 3 * 99),
        (Policy::AlwaysTaken, 2, 404 + 3),
        (Policy::Btfn, 2, 404 + 3),
        (Policy::Bimodal, 2, 404 + 3),
    ] {
        let stats = run(config(1, FULL_FWD, Some(policy)), trace.clone());
        assert_eq!(stats.branch_mispredictions, expected, "{policy:?}");
        assert_eq!(stats.cycles, cycles, "{policy:?}");
    }
}

// ══════════════════════════════════════════════════════════
// 4. Predictor training
// ══════════════════════════════════════════════════════════

/// One ALU op and one branch per step, the branch going taken, taken,
/// not-taken. PCs repeat so the predictor sees a single static branch.
fn periodic_branch(steps: usize) -> Vec<Instruction> {
    (0..steps)
        .flat_map(|i| {
            [
                Instruction::alu(BASE_PC),
                Instruction::branch(BASE_PC + 4, i % 3 != 2, BASE_PC),
            ]
        })
        .collect()
}

/// Mispredictions when every branch is predicted, then trained, strictly in order.
fn in_order_mispredictions(policy: Policy, trace: &[Instruction]) -> u64 {
    let mut bp = BranchPredictorWrapper::from_config(&config(1, FULL_FWD, Some(policy)))
        .expect("policy builds a predictor");
    let mut missed = 0;
    for inst in trace {
        let Some(outcome) = inst.branch else {
            continue;
        };
        let (taken, target) = bp.predict_branch(inst.pc);
        bp.update_branch(inst.pc, outcome.taken, outcome.taken_target());
        if (Prediction { taken, target }).mispredicts(outcome.taken, outcome.target) {
            missed += 1;
        }
    }
    missed
}

#[rstest]
#[case::bimodal(Policy::Bimodal)]
#[case::gshare(Policy::GShare)]
#[case::tournament(Policy::Tournament)]
fn branches_in_flight_do_not_delay_training(#[case] policy: Policy) {
    let trace = periodic_branch(300);
    let expected = in_order_mispredictions(policy, &trace);
    let stats = run(config(2, FULL_FWD, Some(policy)), trace);

    assert_eq!(stats.branches, 300);
    assert_eq!(stats.branch_mispredictions, expected, "{policy:?}");
}

#[rstest]
#[case::gshare(Policy::GShare)]
#[case::tournament(Policy::Tournament)]
fn history_predictors_learn_a_periodic_branch(#[case] policy: Policy) {
    let stats = run(config(2, FULL_FWD, Some(policy)), periodic_branch(300));
    assert!(
        stats.branch_mispredictions < 30,
        "{policy:?} mispredicted {} of 300",
        stats.branch_mispredictions
    );
}

// ══════════════════════════════════════════════════════════
// 5. Files and stepping
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::raw(false)]
#[case::gzip(true)]
fn trace_file_matches_in_memory_run(#[case] compress: bool) {
    let trace = TraceBuilder::new()
        .load(1, Some(2))
        .alu(Some(3), Some(1), None)
        .cc_writer()
        .branch(true, BASE_PC)
        .counted_loop(20, 2)
        .build();
    let cfg = config(2, FULL_FWD, Some(Policy::Bimodal));
    let expected = run(cfg.clone(), trace.clone());

    let file = temp_trace(&trace, compress);
    let stats = Simulator::from_trace_path(cfg, file.path())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(stats, expected);
}

#[test]
fn stepping_matches_run() {
    let trace = TraceBuilder::new().counted_loop(10, 4).build();
    let cfg = config(2, NO_FWD, Some(Policy::GShare));
    let expected = run(cfg.clone(), trace.clone());

    let mut sim = Simulator::new(cfg, MemoryTrace::from(trace)).unwrap();
    assert_eq!(sim.config().pipeline.width, 2);
    let mut steps = 0;
    while !sim.step().unwrap() {
        steps += 1;
    }
    assert_eq!(steps + 1, expected.cycles);
    assert_eq!(sim.pipeline().stats(), &expected);
    assert_eq!(sim.run().unwrap(), expected, "running a finished simulator adds nothing");
}
