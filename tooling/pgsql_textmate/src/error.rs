//! Errors raised while loading a grammar or tokenizing text.

use std::path::PathBuf;

use thiserror::Error;

/// A grammar could not be loaded or compiled.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("failed to read grammar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grammar has no `scopeName`")]
    MissingScopeName,
    #[error("invalid regex in rule `{rule}`: {message}\n  pattern: {pattern}")]
    Regex {
        rule: String,
        pattern: String,
        message: String,
    },
}

/// Tokenization failed partway through the input.
#[derive(Debug, Error)]
pub enum TokenizeError {
    /// An `end`/`while` pattern became invalid after its back-references
    /// were substituted with the text captured by `begin`.
    #[error("invalid back-referenced pattern on line {line}: {message}\n  pattern: {pattern}")]
    BackReference {
        line: usize,
        pattern: String,
        message: String,
    },
}
