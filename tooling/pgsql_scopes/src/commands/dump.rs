//! The `dump` command: show what the tokenizer makes of a file.
//!
//! One token per line as `line:col "text" scope scope ...`, with 1-based
//! lines and 0-based byte columns, the same columns assertion carets use.

use std::fs;
use std::path::Path;

use pgsql_scopes::position::LineOffsets;
use pgsql_textmate::{Tokenize, TokenizeOptions, LINE_SEPARATOR};

use super::{load_highlighter, quoted};

pub fn dump_file(grammar: &Path, file: &Path) -> i32 {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: failed to read {}: {error}", file.display());
            return 1;
        }
    };

    let Some(highlighter) = load_highlighter(grammar) else {
        return 1;
    };

    let tokens = match highlighter.tokenize(&source, TokenizeOptions::with_explanation()) {
        Ok(tokens) => tokens,
        Err(error) => {
            eprintln!("error: failed to tokenize {}: {error}", file.display());
            return 1;
        }
    };

    let lines: Vec<&str> = source.split(LINE_SEPARATOR).collect();
    let offsets = LineOffsets::build(&lines);

    for (index, line) in tokens.lines().enumerate() {
        let start = offsets.line_start(index).unwrap_or(0);
        for token in line {
            let scopes: Vec<&str> = token.scope_names().collect();
            println!(
                "{}:{} {} {}",
                index + 1,
                token.offset.saturating_sub(start),
                quoted(&token.content),
                scopes.join(" ")
            );
        }
    }

    0
}
