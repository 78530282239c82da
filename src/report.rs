// src/report.rs

//! Rendering of finished records for the CLI.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::runner::ProcessRecord;
use crate::types::ReportFormat;

/// Flat, serializable view of one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub index: usize,
    pub command: String,
    pub exit_code: Option<i32>,
    pub killed: bool,
    /// Seconds since the Unix epoch.
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub run_time: f64,
    pub stdout: String,
    pub stderr: String,
}

impl RecordReport {
    pub fn from_record(index: usize, record: &ProcessRecord) -> Self {
        Self {
            index,
            command: record.command().to_string(),
            exit_code: record.exit_code(),
            killed: record.was_killed(),
            start_time: record.start_time().map(epoch_secs),
            end_time: record.end_time().map(epoch_secs),
            run_time: record.run_time().as_secs_f64(),
            stdout: record.stdout_text(),
            stderr: record.stderr_text(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Build reports for every record, in submission order.
pub fn build_reports(records: &[ProcessRecord]) -> Vec<RecordReport> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| RecordReport::from_record(i, r))
        .collect()
}

/// Write the reports in the requested format.
pub fn write_report(
    out: &mut impl Write,
    reports: &[RecordReport],
    format: ReportFormat,
) -> anyhow::Result<()> {
    match format {
        ReportFormat::Text => write_text(&mut *out, reports)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_text(out: &mut impl Write, reports: &[RecordReport]) -> std::io::Result<()> {
    for report in reports {
        let code = report
            .exit_code
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        let killed = if report.killed { " (killed)" } else { "" };

        writeln!(
            out,
            "[{}] {} => exit {}{} in {:.3}s",
            report.index, report.command, code, killed, report.run_time
        )?;
        write_stream(&mut *out, "stdout", &report.stdout)?;
        write_stream(&mut *out, "stderr", &report.stderr)?;
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    writeln!(out, "{} commands, {} failed", reports.len(), failed)?;
    Ok(())
}

fn write_stream(out: &mut impl Write, name: &str, text: &str) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    for line in text.lines() {
        writeln!(out, "    {name}| {line}")?;
    }
    Ok(())
}

fn epoch_secs(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RecordReport> {
        vec![
            RecordReport {
                index: 0,
                command: "echo hi".into(),
                exit_code: Some(0),
                killed: false,
                start_time: Some(1.0),
                end_time: Some(1.5),
                run_time: 0.5,
                stdout: "hi\n".into(),
                stderr: String::new(),
            },
            RecordReport {
                index: 1,
                command: "sleep 9".into(),
                exit_code: Some(137),
                killed: true,
                start_time: Some(1.0),
                end_time: Some(2.0),
                run_time: 1.0,
                stdout: String::new(),
                stderr: "Killing process\n".into(),
            },
        ]
    }

    #[test]
    fn text_report_lists_each_command_and_summary() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample(), ReportFormat::Text).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("[0] echo hi => exit 0 in 0.500s"));
        assert!(text.contains("    stdout| hi"));
        assert!(text.contains("[1] sleep 9 => exit 137 (killed)"));
        assert!(text.contains("    stderr| Killing process"));
        assert!(text.ends_with("2 commands, 1 failed\n"));
    }

    #[test]
    fn json_report_is_an_array_of_objects() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["command"], "echo hi");
        assert_eq!(items[1]["killed"], true);
        assert_eq!(items[1]["exit_code"], 137);
    }
}
