// tests/run_file_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use procrun::config::{load_and_validate, load_from_path};
use procrun::errors::ProcrunError;
use procrun::types::ReportFormat;

fn write_run_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_run_file_is_loaded() {
    let file = write_run_file(
        r#"
[runner]
max_processes = 4
max_run_time = 2.5

[report]
format = "json"

[[command]]
cmd = "echo hello"

[[command]]
cmd = "sleep 10"
"#,
    );

    let plan = load_and_validate(file.path()).unwrap();
    assert_eq!(plan.max_processes, 4);
    assert_eq!(plan.max_run_time, Duration::from_millis(2500));
    assert_eq!(plan.format, ReportFormat::Json);
    assert_eq!(plan.commands, vec!["echo hello", "sleep 10"]);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let file = write_run_file(
        r#"
[[command]]
cmd = "true"
"#,
    );

    let plan = load_and_validate(file.path()).unwrap();
    assert_eq!(plan.max_processes, 1);
    assert_eq!(plan.max_run_time, Duration::ZERO);
    assert_eq!(plan.format, ReportFormat::Text);
}

#[test]
fn zero_max_processes_returns_config_error() {
    let file = write_run_file(
        r#"
[runner]
max_processes = 0
"#,
    );

    match load_and_validate(file.path()) {
        Err(ProcrunError::ConfigError(msg)) => {
            assert!(msg.contains("max_processes"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn negative_max_run_time_returns_config_error() {
    let file = write_run_file(
        r#"
[runner]
max_run_time = -1.0
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ProcrunError::ConfigError(_))
    ));
}

#[test]
fn unknown_report_format_is_a_toml_error() {
    let file = write_run_file(
        r#"
[report]
format = "yaml"
"#,
    );

    assert!(matches!(
        load_from_path(file.path()),
        Err(ProcrunError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    assert!(matches!(
        load_and_validate(&path),
        Err(ProcrunError::IoError(_))
    ));
}
