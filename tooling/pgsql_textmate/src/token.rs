//! Tokenizer output and the `Tokenize` seam.

use crate::error::TokenizeError;

/// Separator between lines of tokenized text.
///
/// Input is split on exactly this string, and token offsets count it once
/// per line. Anything that joins lines for tokenization and later maps
/// columns back onto token offsets must use the same separator.
pub const LINE_SEPARATOR: &str = "\n";

/// Options for a single tokenize call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Attach the scope stack that produced each token.
    pub include_explanation: bool,
}

impl TokenizeOptions {
    pub fn with_explanation() -> Self {
        TokenizeOptions {
            include_explanation: true,
        }
    }
}

/// A contiguous span of one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Byte offset of the token in the whole tokenized text.
    pub offset: usize,
    /// The literal text of the token.
    pub content: String,
    /// Scope stacks covering the token, present only when requested.
    pub explanation: Option<Vec<Explanation>>,
}

impl Token {
    /// One past the last byte of the token.
    pub fn end(&self) -> usize {
        self.offset + self.content.len()
    }

    /// Every scope name from every explanation entry. Empty when the token
    /// carries no explanation.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.explanation
            .iter()
            .flatten()
            .flat_map(|entry| entry.scopes.iter().map(String::as_str))
    }
}

/// One piece of a token and the scope stack it was produced under,
/// outermost (the grammar's root scope) first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Explanation {
    pub content: String,
    pub scopes: Vec<String>,
}

/// Tokens for each line of the input, in line order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedText {
    lines: Vec<Vec<Token>>,
}

impl TokenizedText {
    pub fn new(lines: Vec<Vec<Token>>) -> Self {
        TokenizedText { lines }
    }

    /// Tokens of the 0-based `index`th line, `None` past the last line.
    pub fn line(&self, index: usize) -> Option<&[Token]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    pub fn lines(&self) -> impl Iterator<Item = &[Token]> + '_ {
        self.lines.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Something that turns text into scoped tokens.
///
/// The harness depends on this trait rather than on [`crate::Highlighter`]
/// so it can be driven by a stand-in in tests.
pub trait Tokenize {
    /// The grammar's own top-level scope, e.g. `source.pgsql`.
    fn root_scope(&self) -> &str;

    /// Tokenize `text`, split on [`LINE_SEPARATOR`]. Produces one token
    /// line per input line, including empty ones.
    fn tokenize(
        &self,
        text: &str,
        options: TokenizeOptions,
    ) -> Result<TokenizedText, TokenizeError>;
}
