// src/runner/search.rs

//! Record lookup by index and by command text.

use regex::Regex;

use super::record::ProcessRecord;
use super::{Runner, RunnerError};

/// How a command text is matched.
#[derive(Debug)]
enum CommandFilter<'a> {
    Exact(&'a str),
    Pattern(Regex),
}

impl<'a> CommandFilter<'a> {
    fn new(filter: &'a str, is_regex: bool) -> Result<Self, RunnerError> {
        if is_regex {
            Ok(CommandFilter::Pattern(Regex::new(filter)?))
        } else {
            Ok(CommandFilter::Exact(filter))
        }
    }

    fn matches(&self, command: &str) -> bool {
        match self {
            CommandFilter::Exact(text) => command == *text,
            CommandFilter::Pattern(re) => re.is_match(command),
        }
    }
}

impl Runner {
    /// Record at `index` (submission order).
    pub fn process_info(&self, index: usize) -> Result<&ProcessRecord, RunnerError> {
        self.records.get(index).ok_or(RunnerError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    /// All records whose command equals `filter`, or matches it as a regular
    /// expression when `is_regex` is set. Submission order; empty if none.
    pub fn find_process_info(
        &self,
        filter: &str,
        is_regex: bool,
    ) -> Result<Vec<&ProcessRecord>, RunnerError> {
        let filter = CommandFilter::new(filter, is_regex)?;
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record.command()))
            .collect())
    }
}
