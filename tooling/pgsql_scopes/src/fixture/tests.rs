use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn marks(columns: Range<usize>, scope: &str, negated: bool) -> FixtureLine<'_> {
    FixtureLine::Assertion(AssertionMarks {
        columns,
        scope,
        negated,
    })
}

#[test]
fn classify_code_lines() {
    assert_eq!(
        FixtureLine::classify("SELECT 1;"),
        FixtureLine::Code("SELECT 1;")
    );
    assert_eq!(FixtureLine::classify(""), FixtureLine::Code(""));
    assert_eq!(
        FixtureLine::classify("-- plain comment"),
        FixtureLine::Code("-- plain comment")
    );
    assert_eq!(
        FixtureLine::classify("SELECT 1 --^ not a marker"),
        FixtureLine::Code("SELECT 1 --^ not a marker")
    );
}

#[test]
fn classify_assertion() {
    assert_eq!(
        FixtureLine::classify("--^^^^^^ keyword.other.dml"),
        marks(2..8, "keyword.other.dml", false)
    );
}

#[test]
fn classify_spaced_and_indented_markers() {
    assert_eq!(
        FixtureLine::classify("--     ^^^ constant.numeric"),
        marks(7..10, "constant.numeric", false)
    );
    assert_eq!(
        FixtureLine::classify("  -- ^ punctuation"),
        marks(5..6, "punctuation", false)
    );
}

#[test]
fn classify_negated() {
    assert_eq!(
        FixtureLine::classify("--^^ !keyword"),
        marks(2..4, "keyword", true)
    );
    assert_eq!(
        FixtureLine::classify("--^^ ! keyword  "),
        marks(2..4, "keyword", true)
    );
}

#[test]
fn classify_caret_run_is_contiguous() {
    assert_eq!(FixtureLine::classify("--^^ a^b"), marks(2..4, "a^b", false));
}

#[test]
fn classify_without_scope() {
    assert_eq!(FixtureLine::classify("--^"), marks(2..3, "", false));
}

#[test]
fn parse_anchors_to_preceding_code_line() {
    let fixture = Fixture::parse(
        "  SELECT 1;\n--^^^^^^ keyword\n--       ^ constant.numeric\n  FROM t;\n--^^^^ !string",
    );

    assert_eq!(fixture.code_lines, vec!["  SELECT 1;", "  FROM t;"]);
    assert_eq!(
        fixture.assertions,
        vec![
            Assertion {
                file_line: 2,
                code_line: 0,
                columns: 2..8,
                scope: "keyword".to_string(),
                negated: false,
            },
            Assertion {
                file_line: 3,
                code_line: 0,
                columns: 9..10,
                scope: "constant.numeric".to_string(),
                negated: false,
            },
            Assertion {
                file_line: 5,
                code_line: 1,
                columns: 2..6,
                scope: "string".to_string(),
                negated: true,
            },
        ]
    );
}

#[test]
fn parse_drops_assertion_before_code() {
    let fixture = Fixture::parse("--^^ keyword\nSELECT");

    assert_eq!(fixture.code_lines, vec!["SELECT"]);
    assert!(fixture.assertions.is_empty());
}

#[test]
fn code_excludes_assertion_lines() {
    let fixture = Fixture::parse("a\n--^ x\n\nb\n");
    assert_eq!(fixture.code(), "a\n\nb\n");
}

#[test]
fn label_formats() {
    let assertion = Assertion {
        file_line: 12,
        code_line: 3,
        columns: 4..9,
        scope: "string.quoted".to_string(),
        negated: true,
    };
    assert_eq!(assertion.label(), "line 12 col 4-9: !string.quoted");
}

fn fixture_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9 ;(),']{0,12}",
        "[ ]{0,3}-- ?[ ]{0,3}\\^{1,6}[ ]?!?[a-z.]{0,10}",
        "-- [a-z ]{0,8}",
    ]
}

proptest! {
    #[test]
    fn counts_assertions_after_code(lines in prop::collection::vec(fixture_line(), 0..20)) {
        let source = lines.join("\n");
        let fixture = Fixture::parse(&source);

        let mut seen_code = false;
        let mut expected = 0;
        for line in source.split('\n') {
            match FixtureLine::classify(line) {
                FixtureLine::Code(_) => seen_code = true,
                FixtureLine::Assertion(_) if seen_code => expected += 1,
                FixtureLine::Assertion(_) => {}
            }
        }

        prop_assert_eq!(fixture.assertions.len(), expected);
        prop_assert!(
            fixture.code_lines.len() + fixture.assertions.len() <= source.split('\n').count()
        );
    }

    #[test]
    fn caret_columns_are_non_empty(line in "[ ]{0,3}--[ ]{0,3}\\^{1,6}.{0,10}") {
        match FixtureLine::classify(&line) {
            FixtureLine::Assertion(marks) => {
                prop_assert!(marks.columns.start < marks.columns.end);
                prop_assert!(line[marks.columns.clone()].chars().all(|c| c == '^'));
            }
            FixtureLine::Code(_) => prop_assert!(false, "not classified as an assertion: {line:?}"),
        }
    }
}
