#![allow(dead_code)]

use std::time::Duration;

use procrun::ProcessRecord;

pub use procrun_test_utils::init_tracing;

/// Texts of a log, in order.
pub fn texts(entries: &[procrun::runner::OutputEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.text.as_str()).collect()
}

/// Number of kill notices in a record's stderr log.
pub fn kill_notices(record: &ProcessRecord) -> usize {
    record
        .stderr()
        .iter()
        .filter(|e| e.text == procrun::runner::KILL_NOTICE)
        .count()
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(20);
