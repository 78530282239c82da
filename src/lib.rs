// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod process;
pub mod report;
pub mod runner;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{RunFile, default_run_file_path, load_and_validate};
use crate::errors::{ProcrunError, Result};
use crate::report::{build_reports, write_report};

pub use crate::process::{ProcessHandle, Signal, SystemProcess};
pub use crate::runner::{ProcessRecord, Runner, RunnerError};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - run-file loading and CLI overrides
/// - the runner
/// - the final report on stdout
///
/// Returns `true` when every command exited with code 0.
pub async fn run(args: CliArgs) -> Result<bool> {
    let plan = build_plan(&args)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(true);
    }

    let mut runner = runner_from_plan(&plan)?;
    runner.run().await?;

    let reports = build_reports(runner.records());
    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &reports, plan.format)?;

    let all_ok = reports.iter().all(|r| r.succeeded());
    info!(commands = reports.len(), all_ok, "run complete");
    Ok(all_ok)
}

/// Merge the run file (if any) with CLI overrides into the final plan.
///
/// CLI commands are appended after the run file's commands.
pub fn build_plan(args: &CliArgs) -> Result<RunFile> {
    let mut plan = match resolve_run_file(args.config.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading run file");
            load_and_validate(&path)?
        }
        None => RunFile::default(),
    };

    if let Some(n) = args.max_processes {
        plan.max_processes = config::validate_max_processes(n)?;
    }
    if let Some(secs) = args.max_run_time {
        plan.max_run_time = config::validate_max_run_time(secs)?;
    }
    if let Some(format) = args.format {
        plan.format = format;
    }
    plan.commands.extend(args.commands.iter().cloned());
    config::validate_commands(&plan.commands)?;

    if plan.commands.is_empty() {
        return Err(ProcrunError::ConfigError(
            "no commands to run (pass them as arguments or via [[command]] in a run file)"
                .to_string(),
        ));
    }

    Ok(plan)
}

/// Build a runner with every command of `plan` submitted.
pub fn runner_from_plan(plan: &RunFile) -> Result<Runner> {
    let mut runner = Runner::new(plan.max_processes, plan.max_run_time)?;
    for cmd in &plan.commands {
        runner.add_command(cmd.as_str());
    }
    Ok(runner)
}

/// Explicit `--config` wins; otherwise the default run file, if it exists.
fn resolve_run_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = default_run_file_path();
            default.is_file().then_some(default)
        }
    }
}

/// Simple dry-run output: print runner settings and commands.
fn print_dry_run(plan: &RunFile) {
    println!("procrun dry-run");
    println!("  max_processes = {}", plan.max_processes);
    if plan.max_run_time.is_zero() {
        println!("  max_run_time = unlimited");
    } else {
        println!("  max_run_time = {:?}", plan.max_run_time);
    }
    println!("  format = {:?}", plan.format);
    println!();

    println!("commands ({}):", plan.commands.len());
    for (i, cmd) in plan.commands.iter().enumerate() {
        println!("  [{i}] {cmd}");
    }

    debug!("dry-run complete (no execution)");
}
