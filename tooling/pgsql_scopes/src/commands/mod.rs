//! Command handlers for the `pgsql-scopes` CLI.
//!
//! Each handler owns the [`Highlighter`] for the length of the command and
//! returns the process exit code, so the grammar is released before the
//! process exits on every path.

use std::path::Path;

use pgsql_textmate::Highlighter;

mod audit;
mod dump;
mod test;

pub use audit::run_audit;
pub use dump::dump_file;
pub use test::run_tests;

/// Load and compile the grammar, reporting failure on stderr.
fn load_highlighter(grammar: &Path) -> Option<Highlighter> {
    match Highlighter::from_path(grammar) {
        Ok(highlighter) => Some(highlighter),
        Err(error) => {
            eprintln!("error: {error}");
            None
        }
    }
}

/// Quote `text` the way the reports show token text.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}
