//! Assertion runner.
//!
//! Each fixture's code is tokenized once, as a whole, with explanations on;
//! every assertion is then checked against the token line it points at.
//! Files run one after another in sorted order and every assertion of every
//! file is checked, whatever failed before it.

use std::fs;
use std::path::Path;
use std::time::Instant;

use pgsql_textmate::{Tokenize, TokenizeOptions, TokenizedText};

use crate::discovery::{discover_in, FileKind};
use crate::error::RunError;
use crate::fixture::{Assertion, Fixture};
use crate::position::LineOffsets;
use crate::result::{AssertionOutcome, AssertionResult, FileSummary, RunSummary};
use crate::scope::scopes_in_range;

/// Configuration for the assertion runner.
#[derive(Clone, Debug, Default)]
pub struct RunnerConfig {
    /// Only check assertions whose label contains this text.
    pub filter: Option<String>,
    /// Report passing assertions too.
    pub verbose: bool,
}

pub struct AssertionRunner<'t, T: Tokenize + ?Sized> {
    tokenizer: &'t T,
    config: RunnerConfig,
}

impl<'t, T: Tokenize + ?Sized> AssertionRunner<'t, T> {
    pub fn new(tokenizer: &'t T) -> Self {
        Self::with_config(tokenizer, RunnerConfig::default())
    }

    pub fn with_config(tokenizer: &'t T, config: RunnerConfig) -> Self {
        AssertionRunner { tokenizer, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every fixture under `path` (a fixture file or a directory).
    pub fn run(&self, path: &Path) -> Result<RunSummary, RunError> {
        let files = discover_in(path, FileKind::Fixture);
        tracing::debug!(
            path = %path.display(),
            files = files.len(),
            "running fixtures"
        );

        let mut summary = RunSummary::new();
        let start = Instant::now();
        for file in &files {
            summary.add_file(self.run_file(&file.path)?);
        }
        summary.duration = start.elapsed();
        Ok(summary)
    }

    pub fn run_file(&self, path: &Path) -> Result<FileSummary, RunError> {
        let source = fs::read_to_string(path).map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.run_source(path, &source)
    }

    /// Check the assertions of fixture text `source`, reported as `path`.
    pub fn run_source(&self, path: &Path, source: &str) -> Result<FileSummary, RunError> {
        let start = Instant::now();
        let fixture = Fixture::parse(source);
        let tokens = self
            .tokenizer
            .tokenize(&fixture.code(), TokenizeOptions::with_explanation())
            .map_err(|source| RunError::Tokenize {
                path: path.to_path_buf(),
                source,
            })?;
        let offsets = LineOffsets::build(&fixture.code_lines);

        let mut summary = FileSummary::new(path.to_path_buf());
        for assertion in &fixture.assertions {
            if !self.selects(assertion) {
                continue;
            }
            let outcome = check_assertion(assertion, &tokens, &offsets);
            if let AssertionOutcome::Failed(message) = &outcome {
                tracing::trace!(
                    label = %assertion.label(),
                    reason = %message,
                    "assertion failed"
                );
            }
            summary.add_result(AssertionResult::new(path.to_path_buf(), assertion, outcome));
        }

        summary.duration = start.elapsed();
        tracing::debug!(
            path = %path.display(),
            passed = summary.passed,
            failed = summary.failed,
            "checked fixture"
        );
        Ok(summary)
    }

    fn selects(&self, assertion: &Assertion) -> bool {
        match &self.config.filter {
            Some(filter) => assertion.label().contains(filter.as_str()),
            None => true,
        }
    }
}

/// Check one assertion against the tokens of the whole fixture.
pub fn check_assertion(
    assertion: &Assertion,
    tokens: &TokenizedText,
    offsets: &LineOffsets,
) -> AssertionOutcome {
    let line = tokens.line(assertion.code_line);
    let range = offsets.absolute(assertion.code_line, &assertion.columns);
    let (Some(line), Some(range)) = (line, range) else {
        return AssertionOutcome::Failed(format!(
            "No tokens for code line {}",
            assertion.code_line + 1
        ));
    };

    let found = scopes_in_range(line, &range);
    let present = found.any_matches(&assertion.scope);
    let columns = format!("{}-{}", assertion.columns.start, assertion.columns.end);

    match (assertion.negated, present) {
        (false, true) | (true, false) => AssertionOutcome::Passed,
        (false, false) => AssertionOutcome::Failed(format!(
            "Expected scope \"{}\" at columns {columns}.\nFound scopes: {found}",
            assertion.scope
        )),
        (true, true) => AssertionOutcome::Failed(format!(
            "Expected scope \"{}\" to NOT be present at columns {columns}.\nFound scopes: {found}",
            assertion.scope
        )),
    }
}
