//! Scope-assertion harness for the `PostgreSQL` `TextMate` grammar.
//!
//! Fixture files mix SQL with assertion comments that say which scope the
//! tokenizer must (or must not) give the columns above them:
//!
//! ```text
//! fixture ──► Fixture::parse ──► code + assertions
//!                                  │
//!            Tokenize::tokenize ◄──┘
//!                  │
//!                  ▼
//!   LineOffsets ──► scopes_in_range ──► scope_matches ──► AssertionResult
//! ```
//!
//! The [`audit`] module is a separate sweep over plain sample files that
//! lists every visible token the grammar left without a meaningful scope.

use std::sync::Once;

pub mod audit;
pub mod discovery;
mod error;
pub mod fixture;
pub mod position;
pub mod result;
pub mod runner;
pub mod scope;

#[cfg(test)]
mod testing;

pub use audit::{AuditReport, Auditor, FileAudit};
pub use error::RunError;
pub use fixture::{Assertion, Fixture, FixtureLine};
pub use result::{AssertionOutcome, AssertionResult, FileSummary, RunSummary};
pub use runner::{AssertionRunner, RunnerConfig};
pub use scope::scope_matches;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=pgsql_textmate=trace`.
/// Logs go to stderr so reports on stdout stay clean. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
