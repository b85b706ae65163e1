//! Oniguruma-backed regex patterns.
//!
//! `TextMate` grammars are written against Oniguruma syntax (look-behind,
//! `\G`, possessive quantifiers, mixed named and numbered groups), so
//! patterns are compiled with `onig` rather than a Rust-native engine.

use std::fmt;

use onig::{Regex, RegexOptions, Region, SearchOptions, Syntax};

/// A compiled pattern together with the source it was compiled from.
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` with numbered groups kept capturing even when named
    /// groups are present (the convention `TextMate` grammars rely on).
    pub fn new(source: &str) -> Result<Self, onig::Error> {
        let regex = Regex::with_options(
            source,
            RegexOptions::REGEX_OPTION_CAPTURE_GROUP,
            Syntax::default(),
        )?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    /// Search `haystack` for the leftmost match starting at or after `from`.
    ///
    /// On success the match and its groups are left in `region` and the
    /// match start is returned.
    pub fn search(&self, haystack: &str, from: usize, region: &mut Region) -> Option<usize> {
        self.regex.search_with_options(
            haystack,
            from,
            haystack.len(),
            SearchOptions::SEARCH_OPTION_NONE,
            Some(region),
        )
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// Returns true if `source` refers back to a group of another pattern
/// (`\1` through `\9`), which makes it uncompilable until the text of those
/// groups is known.
pub fn has_back_references(source: &str) -> bool {
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                if matches!(next, '1'..='9') {
                    return true;
                }
            }
        }
    }
    false
}

/// Substitute `\1`..`\9` in `source` with the escaped text of the matching
/// entry in `groups`. Groups that did not participate become empty.
pub fn resolve_back_references(source: &str, groups: &[Option<&str>]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(digit @ '1'..='9') => {
                let index = digit as usize - '0' as usize;
                if let Some(Some(text)) = groups.get(index) {
                    out.push_str(&escape(text));
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Escape every Oniguruma metacharacter in `text`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '^'
                | '$'
                | '.'
                | '|'
                | '?'
                | '*'
                | '+'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '-'
                | '#'
                | ' '
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
