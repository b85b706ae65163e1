//! A stand-in tokenizer for unit tests.

use pgsql_textmate::{
    Explanation, Token, Tokenize, TokenizeError, TokenizeOptions, TokenizedText, LINE_SEPARATOR,
};

pub const ROOT: &str = "source.pgsql";

/// Splits lines into words and the whitespace between them. Known words
/// (case-insensitive) get their scope under [`ROOT`]; everything else gets
/// only [`ROOT`].
#[derive(Default)]
pub struct FakeTokenizer {
    words: Vec<(String, String)>,
    drop_lines: bool,
    fail: bool,
}

impl FakeTokenizer {
    pub fn new() -> Self {
        FakeTokenizer::default()
    }

    pub fn word(mut self, word: &str, scope: &str) -> Self {
        self.words.push((word.to_lowercase(), scope.to_string()));
        self
    }

    /// Produce no token lines at all.
    pub fn dropping_lines(mut self) -> Self {
        self.drop_lines = true;
        self
    }

    /// Fail every tokenize call.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn scopes_for(&self, text: &str) -> Vec<String> {
        let mut scopes = vec![ROOT.to_string()];
        let lower = text.to_lowercase();
        if let Some((_, scope)) = self.words.iter().find(|(word, _)| *word == lower) {
            scopes.push(scope.clone());
        }
        scopes
    }
}

impl Tokenize for FakeTokenizer {
    fn root_scope(&self) -> &str {
        ROOT
    }

    fn tokenize(
        &self,
        text: &str,
        options: TokenizeOptions,
    ) -> Result<TokenizedText, TokenizeError> {
        if self.fail {
            return Err(TokenizeError::BackReference {
                line: 1,
                pattern: "(".to_string(),
                message: "end pattern at end of pattern".to_string(),
            });
        }
        if self.drop_lines {
            return Ok(TokenizedText::default());
        }

        let mut lines = Vec::new();
        let mut line_offset = 0;
        for line in text.split(LINE_SEPARATOR) {
            let mut tokens = Vec::new();
            let mut start = 0;
            while start < line.len() {
                let is_space = line[start..].starts_with(char::is_whitespace);
                let len = line[start..]
                    .find(|c: char| c.is_whitespace() != is_space)
                    .unwrap_or(line.len() - start);
                let content = &line[start..start + len];
                let scopes = if is_space {
                    vec![ROOT.to_string()]
                } else {
                    self.scopes_for(content)
                };
                tokens.push(Token {
                    offset: line_offset + start,
                    content: content.to_string(),
                    explanation: options.include_explanation.then(|| {
                        vec![Explanation {
                            content: content.to_string(),
                            scopes,
                        }]
                    }),
                });
                start += len;
            }
            lines.push(tokens);
            line_offset += line.len() + LINE_SEPARATOR.len();
        }
        Ok(TokenizedText::new(lines))
    }
}
