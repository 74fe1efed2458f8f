#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the `cpu_topology` diagnostic tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::num::NonZero;
use std::process::ExitCode;

use argh::FromArgs;
use cpu_topology::{CpuTopology, DetectionOptions};
use itertools::Itertools;
use tracing::Level;

/// Detects the CPU topology of the current host or container and prints a summary.
#[derive(FromArgs)]
struct Args {
    /// override the usable core count (takes precedence over CPU_TOPOLOGY_NUM_CORES)
    #[argh(option)]
    num_cores: Option<NonZero<usize>>,

    /// print the usable core IDs, one line, space-separated
    #[argh(switch)]
    cores: bool,

    /// print the instruction set extensions this binary was built for but the host lacks
    #[argh(switch)]
    unsupported_flags: bool,

    /// log detection details to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let options = match args.num_cores {
        Some(count) => DetectionOptions::new().override_core_count(count),
        None => DetectionOptions::from_env(),
    };

    let topology = CpuTopology::init(&options);

    if args.cores {
        println!("{}", topology.usable_core_ids().iter().join(" "));
        return ExitCode::SUCCESS;
    }

    if args.unsupported_flags {
        let unsupported = topology.unsupported_flags_for_build();

        if unsupported.is_empty() {
            println!("The host supports every instruction set extension this binary was built for.");
            return ExitCode::SUCCESS;
        }

        println!(
            "This binary was built for instruction set extensions the host does not support: {}",
            unsupported.iter().join(" ")
        );
        return ExitCode::FAILURE;
    }

    print!("{topology}");

    ExitCode::SUCCESS
}
