// src/types.rs

use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// How the final report is rendered.
///
/// - `Text`: one block per command with exit code, timing and captured
///   output (default).
/// - `Json`: a JSON array of per-command objects, for machine consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "invalid report format: {other} (expected \"text\" or \"json\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!(" text ".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("yaml".parse::<ReportFormat>().is_err());
    }
}
