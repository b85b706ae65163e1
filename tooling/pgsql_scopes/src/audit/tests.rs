use pgsql_textmate::Explanation;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::*;
use crate::testing::{FakeTokenizer, ROOT};

fn token(content: &str, scopes: Option<&[&str]>) -> Token {
    Token {
        offset: 0,
        content: content.to_string(),
        explanation: scopes.map(|scopes| {
            vec![Explanation {
                content: content.to_string(),
                scopes: scopes.iter().map(|scope| (*scope).to_string()).collect(),
            }]
        }),
    }
}

#[test]
fn meaningful_scopes() {
    assert!(is_meaningful_scope("keyword.other", ROOT));
    assert!(!is_meaningful_scope(ROOT, ROOT));
    assert!(!is_meaningful_scope("meta.group.pgsql", ROOT));
    assert!(is_meaningful_scope("source.pgsql.embedded", ROOT));
}

#[test]
fn whitespace_is_never_unscoped() {
    assert!(!is_unscoped(&token("   ", Some(&[ROOT])), ROOT));
    assert!(!is_unscoped(&token("\t", None), ROOT));
}

#[test]
fn root_and_meta_only_is_unscoped() {
    assert!(is_unscoped(&token("x", Some(&[ROOT])), ROOT));
    assert!(is_unscoped(
        &token("(", Some(&[ROOT, "meta.group.pgsql"])),
        ROOT
    ));
    assert!(!is_unscoped(
        &token("(", Some(&[ROOT, "meta.group.pgsql", "punctuation.section"])),
        ROOT
    ));
}

#[test]
fn missing_explanation_is_unscoped() {
    assert!(is_unscoped(&token("x", None), ROOT));
}

#[test]
fn audit_source_lists_trimmed_text() {
    let tokenizer = FakeTokenizer::new().word("select", "keyword.other.dml");
    let audit = Auditor::new(&tokenizer)
        .audit_source(Path::new("demo.sql"), "SELECT frob\n  ;")
        .unwrap();

    assert_eq!(audit.unscoped, vec!["frob".to_string(), ";".to_string()]);
    assert!(!audit.is_clean());
    assert_eq!(audit.display_name(), "demo.sql");
}

#[test]
fn audit_skips_fixtures_and_totals() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.sql"), "select x").unwrap();
    fs::write(dir.path().join("b.sql"), "select").unwrap();
    fs::write(dir.path().join("c.test.sql"), "nope nope").unwrap();

    let tokenizer = FakeTokenizer::new().word("select", "keyword.other.dml");
    let report = Auditor::new(&tokenizer).audit(dir.path()).unwrap();

    let names: Vec<_> = report.files.iter().map(FileAudit::display_name).collect();
    assert_eq!(names, vec!["a.sql", "b.sql"]);
    assert_eq!(report.total(), 1);
    assert_eq!(report.exit_code(), 1);
    assert!(report.files[1].is_clean());
}

#[test]
fn empty_report_is_clean() {
    let report = AuditReport::default();
    assert!(report.is_clean());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn unreadable_sample_is_an_error() {
    let dir = tempdir().unwrap();
    let tokenizer = FakeTokenizer::new();
    let result = Auditor::new(&tokenizer).audit_file(&dir.path().join("missing.sql"));
    assert!(matches!(result, Err(RunError::Read { .. })));
}
