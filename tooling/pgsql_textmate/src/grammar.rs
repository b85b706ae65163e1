//! `TextMate` grammars: the JSON model and its compiled form.

pub mod compile;
pub mod raw;

pub use compile::{CompiledGrammar, Rule, RuleId};
pub use raw::{RawGrammar, RawRule};
