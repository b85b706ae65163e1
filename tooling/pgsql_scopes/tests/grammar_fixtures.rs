//! Runs the repository's fixtures and samples against the real grammar.
//!
//! Every assertion under `tests/` must hold and every visible token under
//! `samples/` must carry a meaningful scope.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use pgsql_scopes::{AssertionResult, AssertionRunner, Auditor};
use pgsql_textmate::Highlighter;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap()
}

fn grammar() -> Highlighter {
    Highlighter::from_path(&repo_root().join("pgsql.tmLanguage.json")).unwrap()
}

fn describe(result: &AssertionResult) -> String {
    format!(
        "{}: {} {:?}",
        result.file.display(),
        result.label,
        result.outcome
    )
}

#[test]
fn fixtures_pass() {
    let highlighter = grammar();
    let summary = AssertionRunner::new(&highlighter)
        .run(&repo_root().join("tests"))
        .unwrap();

    let failures: Vec<_> = summary
        .files
        .iter()
        .flat_map(|file| &file.results)
        .filter(|result| result.outcome.is_failed())
        .map(describe)
        .collect();

    assert!(
        failures.is_empty(),
        "failing assertions:\n{}",
        failures.join("\n")
    );
    assert!(summary.passed > 0, "no assertions found");
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn every_fixture_file_is_run() {
    let highlighter = grammar();
    let summary = AssertionRunner::new(&highlighter)
        .run(&repo_root().join("tests"))
        .unwrap();

    let names: Vec<_> = summary
        .files
        .iter()
        .filter_map(|file| file.path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "comments.test.sql",
            "expressions.test.sql",
            "keywords.test.sql",
            "strings.test.sql",
        ]
    );
    assert!(summary.files.iter().all(|file| file.total() > 0));
}

#[test]
fn samples_are_fully_scoped() {
    let highlighter = grammar();
    let report = Auditor::new(&highlighter)
        .audit(&repo_root().join("samples"))
        .unwrap();

    let mut unscoped = Vec::new();
    for file in &report.files {
        for text in &file.unscoped {
            unscoped.push(format!("{}: {text:?}", file.display_name()));
        }
    }

    assert!(!report.files.is_empty(), "no samples found");
    assert!(
        unscoped.is_empty(),
        "unscoped tokens:\n{}",
        unscoped.join("\n")
    );
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn fixtures_are_not_audited() {
    let highlighter = grammar();
    let report = Auditor::new(&highlighter)
        .audit(&repo_root().join("tests"))
        .unwrap();

    assert!(report.files.is_empty());
}
