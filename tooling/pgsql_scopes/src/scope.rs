//! Hierarchical scope-name matching.

use std::fmt;
use std::ops::Range;

use pgsql_textmate::Token;

/// Whether `actual` is `expected` or one of its dotted descendants.
///
/// `keyword` is satisfied by `keyword` and `keyword.control.select`, but not
/// by `keywordish`; a more specific expectation is never satisfied by a more
/// general scope.
pub fn scope_matches(actual: &str, expected: &str) -> bool {
    actual
        .strip_prefix(expected)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Distinct scope names in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoundScopes {
    names: Vec<String>,
}

impl FoundScopes {
    pub fn insert(&mut self, name: &str) {
        if !self.names.iter().any(|existing| existing == name) {
            self.names.push(name.to_string());
        }
    }

    /// Whether any collected scope satisfies `expected`.
    pub fn any_matches(&self, expected: &str) -> bool {
        self.names.iter().any(|name| scope_matches(name, expected))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for FoundScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(", "))
    }
}

/// Every scope of every token overlapping the absolute `range`.
///
/// Overlap is strict: a token ending exactly at `range.start`, or starting
/// at `range.end`, does not count. Tokens without an explanation add
/// nothing.
pub fn scopes_in_range(tokens: &[Token], range: &Range<usize>) -> FoundScopes {
    let mut found = FoundScopes::default();
    for token in tokens {
        if token.offset < range.end && token.end() > range.start {
            for name in token.scope_names() {
                found.insert(name);
            }
        }
    }
    found
}
