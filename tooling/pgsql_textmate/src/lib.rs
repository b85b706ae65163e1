//! `TextMate` grammar tokenizer.
//!
//! Loads a `.tmLanguage.json` grammar, compiles its rules once, and splits
//! text into tokens annotated with the scope stack that produced them.
//!
//! ```text
//! grammar JSON ──► RawGrammar ──► CompiledGrammar ──► Highlighter
//!                                                         │
//!                            text ──► tokenize() ──► TokenizedText
//! ```
//!
//! Only the parts of the `TextMate` format that single-language grammars use
//! are supported: `match`, `begin`/`end`, `begin`/`while`, captures,
//! `contentName`, and `#name`/`$self`/`$base` includes. Includes of other
//! grammars and injections are ignored.

mod engine;
mod error;
pub mod grammar;
pub mod pattern;
mod token;

pub use engine::Highlighter;
pub use error::{GrammarError, TokenizeError};
pub use token::{Explanation, Token, Tokenize, TokenizeOptions, TokenizedText, LINE_SEPARATOR};
