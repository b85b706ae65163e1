//! Errors that abort a run.
//!
//! Problems with a single assertion never end up here; they become failed
//! [`AssertionOutcome`](crate::result::AssertionOutcome)s instead.

use std::path::PathBuf;

use pgsql_textmate::TokenizeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to tokenize {path}: {source}")]
    Tokenize {
        path: PathBuf,
        #[source]
        source: TokenizeError,
    },
}
