// tests/cli_plan.rs

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use tempfile::NamedTempFile;

use procrun::cli::CliArgs;
use procrun::errors::ProcrunError;
use procrun::types::ReportFormat;
use procrun::{build_plan, runner_from_plan};

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["procrun"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).unwrap()
}

#[test]
fn cli_only_plan_uses_defaults() {
    let plan = build_plan(&args(&["echo a", "echo b"])).unwrap();

    assert_eq!(plan.max_processes, 1);
    assert_eq!(plan.max_run_time, Duration::ZERO);
    assert_eq!(plan.format, ReportFormat::Text);
    assert_eq!(plan.commands, vec!["echo a", "echo b"]);
}

#[test]
fn cli_overrides_run_file_and_appends_commands() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
max_processes = 2
max_run_time = 10

[[command]]
cmd = "echo from-file"
"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let plan = build_plan(&args(&[
        "--config", &path, "-j", "5", "-t", "0.25", "--format", "json", "echo from-cli",
    ]))
    .unwrap();

    assert_eq!(plan.max_processes, 5);
    assert_eq!(plan.max_run_time, Duration::from_millis(250));
    assert_eq!(plan.format, ReportFormat::Json);
    assert_eq!(plan.commands, vec!["echo from-file", "echo from-cli"]);

    let runner = runner_from_plan(&plan).unwrap();
    assert_eq!(runner.len(), 2);
    assert_eq!(runner.max_processes(), 5);
    assert_eq!(runner.max_run_time(), Duration::from_millis(250));
}

#[test]
fn no_commands_is_a_config_error() {
    match build_plan(&args(&[])) {
        Err(ProcrunError::ConfigError(msg)) => assert!(msg.contains("no commands")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_cli_overrides_are_rejected() {
    assert!(matches!(
        build_plan(&args(&["-j", "0", "true"])),
        Err(ProcrunError::ConfigError(_))
    ));
    assert!(matches!(
        build_plan(&args(&["-t", "-3", "true"])),
        Err(ProcrunError::ConfigError(_))
    ));
}

#[test]
fn blank_cli_command_is_rejected_like_a_blank_run_file_entry() {
    match build_plan(&args(&["echo a", "  "])) {
        Err(ProcrunError::ConfigError(msg)) => assert!(msg.contains("#2")),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[[command]]\ncmd = \"echo from-file\"\n").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    // Positions count across run file and CLI commands.
    match build_plan(&args(&["--config", &path, ""])) {
        Err(ProcrunError::ConfigError(msg)) => assert!(msg.contains("#2")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
