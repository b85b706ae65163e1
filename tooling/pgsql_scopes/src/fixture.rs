//! Fixture files: SQL statements interleaved with scope assertions.
//!
//! An assertion line is a SQL comment whose carets sit under the columns of
//! the nearest code line above it:
//!
//! ```text
//!   SELECT name FROM users;
//! --^^^^^^ keyword.other.dml
//! --             ^^^^ !entity.name.function
//! ```
//!
//! Assertion lines are removed from the code handed to the tokenizer, so
//! they never shift the columns of later code lines.

use std::ops::Range;

use pgsql_textmate::LINE_SEPARATOR;

/// One raw line of a fixture file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FixtureLine<'a> {
    Code(&'a str),
    Assertion(AssertionMarks<'a>),
}

/// What an assertion line says, before it is anchored to a code line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionMarks<'a> {
    /// Columns under the caret run, first caret to one past the last.
    pub columns: Range<usize>,
    pub scope: &'a str,
    pub negated: bool,
}

impl<'a> FixtureLine<'a> {
    /// Classify a line: optional whitespace, `--`, optional whitespace, then
    /// a run of `^` makes an assertion; everything else is code.
    pub fn classify(line: &'a str) -> Self {
        let marker = line.trim_start();
        let Some(after_dashes) = marker.strip_prefix("--") else {
            return FixtureLine::Code(line);
        };
        let carets = after_dashes.trim_start();
        if !carets.starts_with('^') {
            return FixtureLine::Code(line);
        }

        let start = line.len() - carets.len();
        let run = carets.len() - carets.trim_start_matches('^').len();
        let rest = carets[run..].trim();
        let (scope, negated) = match rest.strip_prefix('!') {
            Some(scope) => (scope.trim(), true),
            None => (rest, false),
        };

        FixtureLine::Assertion(AssertionMarks {
            columns: start..start + run,
            scope,
            negated,
        })
    }
}

/// A scope expectation anchored to a code line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    /// 1-based line of the assertion in the fixture file.
    pub file_line: usize,
    /// 0-based index of the judged line among the code lines.
    pub code_line: usize,
    /// Byte columns within the code line.
    pub columns: Range<usize>,
    pub scope: String,
    pub negated: bool,
}

impl Assertion {
    /// `line 4 col 2-8: keyword.other.dml`, with `!` before negated scopes.
    pub fn label(&self) -> String {
        let prefix = if self.negated { "!" } else { "" };
        format!(
            "line {} col {}-{}: {prefix}{}",
            self.file_line, self.columns.start, self.columns.end, self.scope
        )
    }
}

/// A fixture split into the code to tokenize and the assertions about it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fixture<'src> {
    pub code_lines: Vec<&'src str>,
    pub assertions: Vec<Assertion>,
}

impl<'src> Fixture<'src> {
    pub fn parse(source: &'src str) -> Self {
        let mut fixture = Fixture::default();

        for (index, line) in source.split(LINE_SEPARATOR).enumerate() {
            match FixtureLine::classify(line) {
                FixtureLine::Code(code) => fixture.code_lines.push(code),
                FixtureLine::Assertion(marks) => {
                    let Some(code_line) = fixture.code_lines.len().checked_sub(1) else {
                        tracing::debug!(
                            line = index + 1,
                            "dropping assertion before any code line"
                        );
                        continue;
                    };
                    fixture.assertions.push(Assertion {
                        file_line: index + 1,
                        code_line,
                        columns: marks.columns,
                        scope: marks.scope.to_string(),
                        negated: marks.negated,
                    });
                }
            }
        }

        fixture
    }

    /// The code lines joined the way the tokenizer splits them.
    pub fn code(&self) -> String {
        self.code_lines.join(LINE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests;
