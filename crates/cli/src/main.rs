//! Pipeline simulator CLI.
//!
//! This binary runs one instruction trace through the pipeline model and prints
//! the `LAB2_*` report on stdout. It performs:
//! 1. **Argument normalization:** Accepts the historical single-dash long flags
//!    (`-pipewidth 2`) alongside the standard `--pipewidth 2` form.
//! 2. **Configuration:** Starts from defaults or a JSON file, then applies explicit flags.
//! 3. **Reporting:** Prints the report, and optionally writes the statistics as JSON.
//!
//! Diagnostics go to stderr; stdout carries only the report.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use pipesim_core::config::BranchPredictor;
use pipesim_core::stats::StatsDocument;
use pipesim_core::{Config, SimError, SimStats, Simulator};

/// Long flags that the historical command line spells with a single dash.
const LEGACY_FLAGS: [&str; 4] = ["pipewidth", "enablememfwd", "enableexefwd", "bpredpolicy"];

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Trace-driven N-wide in-order pipeline simulator",
    long_about = "Simulate a five-stage in-order pipeline over an instruction trace and report CPI and branch misprediction rate.\n\nSingle-dash long flags are accepted for compatibility.\n\nExamples:\n  sim -pipewidth 2 -enableexefwd -enablememfwd traces/gcc.ptr.gz\n  sim --bpredpolicy 4 --stats-json out.json traces/bzip2.ptr.gz"
)]
struct Cli {
    /// Instructions per cycle per stage (1-8).
    #[arg(long, value_name = "N")]
    pipewidth: Option<usize>,

    /// Forward results from the Memory stage to Decode.
    #[arg(long)]
    enablememfwd: bool,

    /// Forward non-load results from the Execute stage to Decode.
    #[arg(long)]
    enableexefwd: bool,

    /// Branch predictor policy code: 1 always-not-taken, 2 BTFN, 3 bimodal,
    /// 4 gshare, 5 always-taken, 6 tournament. Omit to disable prediction.
    #[arg(long, value_name = "CODE")]
    bpredpolicy: Option<u32>,

    /// JSON configuration file; explicit flags take precedence over it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the final statistics to this file as JSON.
    #[arg(long, value_name = "FILE")]
    stats_json: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Instruction trace (raw or gzip-compressed).
    trace: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_logging(cli.verbose);

    match run(&cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the simulation and writes the report to `out`. Nothing reaches `out` on failure.
fn run(cli: &Cli, out: &mut impl Write) -> Result<(), SimError> {
    let config = build_config(cli)?;
    let stats = Simulator::from_trace_path(config, &cli.trace)?.run()?;

    if let Some(path) = &cli.stats_json {
        write_stats_json(path, &stats)?;
    }
    write!(out, "{}", stats.report())
        .and_then(|()| out.flush())
        .map_err(|e| SimError::io("writing report", e))
}

/// Rewrites `-flag` to `--flag` for the historical single-dash long flags.
///
/// `-flag=value` is rewritten too. Everything else, including the program
/// name and short flags like `-v`, passes through untouched.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let legacy = arg.to_str().is_some_and(|s| {
                s.strip_prefix('-')
                    .filter(|rest| !rest.starts_with('-'))
                    .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name))
                    .is_some_and(|name| LEGACY_FLAGS.contains(&name))
            });
            if legacy {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

/// Starts from the JSON file (or defaults) and applies explicit flags on top.
fn build_config(cli: &Cli) -> Result<Config, SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(width) = cli.pipewidth {
        config.pipeline.width = width;
    }
    if cli.enablememfwd {
        config.pipeline.forwarding.memory = true;
    }
    if cli.enableexefwd {
        config.pipeline.forwarding.execute = true;
    }
    if let Some(code) = cli.bpredpolicy {
        config.pipeline.branch_predictor = Some(BranchPredictor::from_code(code)?);
    }
    Ok(config)
}

fn write_stats_json(path: &Path, stats: &SimStats) -> Result<(), SimError> {
    let context = || format!("writing stats {}", path.display());
    let text = serde_json::to_string_pretty(&StatsDocument::from(stats))
        .map_err(|e| SimError::io(context(), io::Error::from(e)))?;
    fs::write(path, text).map_err(|e| SimError::io(context(), e))
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
