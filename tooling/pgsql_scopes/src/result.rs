//! Assertion result types.

use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use crate::fixture::Assertion;

/// Outcome of a single assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssertionOutcome {
    Passed,
    /// Failed with a diagnostic naming the expected and the found scopes.
    Failed(String),
}

impl AssertionOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, AssertionOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssertionOutcome::Failed(_))
    }
}

/// Result of checking one assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionResult {
    /// Fixture the assertion came from.
    pub file: PathBuf,
    /// 1-based line of the assertion in the fixture.
    pub file_line: usize,
    pub columns: Range<usize>,
    pub scope: String,
    pub negated: bool,
    /// `line N col a-b: [!]scope`, the name the result is reported under.
    pub label: String,
    pub outcome: AssertionOutcome,
}

impl AssertionResult {
    pub fn new(file: PathBuf, assertion: &Assertion, outcome: AssertionOutcome) -> Self {
        AssertionResult {
            file,
            file_line: assertion.file_line,
            columns: assertion.columns.clone(),
            scope: assertion.scope.clone(),
            negated: assertion.negated,
            label: assertion.label(),
            outcome,
        }
    }
}

/// Results for a single fixture file.
#[derive(Clone, Debug, Default)]
pub struct FileSummary {
    pub path: PathBuf,
    /// In source order.
    pub results: Vec<AssertionResult>,
    pub passed: usize,
    pub failed: usize,
    /// Time to tokenize the file and check its assertions.
    pub duration: Duration,
}

impl FileSummary {
    pub fn new(path: PathBuf) -> Self {
        FileSummary {
            path,
            ..Default::default()
        }
    }

    pub fn add_result(&mut self, result: AssertionResult) {
        match &result.outcome {
            AssertionOutcome::Passed => self.passed += 1,
            AssertionOutcome::Failed(_) => self.failed += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Results of a whole run, one entry per fixture file in run order.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub files: Vec<FileSummary>,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        RunSummary::default()
    }

    pub fn add_file(&mut self, summary: FileSummary) {
        self.passed += summary.passed;
        self.failed += summary.failed;
        self.duration += summary.duration;
        self.files.push(summary);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// 0 when nothing failed (including when there was nothing to check),
    /// 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }
}
