//! Line-by-line tokenization against a compiled grammar.
//!
//! Each line is scanned left to right. At every position the innermost
//! active rule offers its candidates (its `end` pattern plus its flattened
//! `patterns`); the candidate whose match starts earliest wins, ties going
//! to the earlier candidate. `begin` rules push a frame that survives to
//! later lines until their `end` matches (or, for `while` rules, until the
//! `while` pattern fails at the start of a line).
//!
//! Lines are matched with a trailing `\n` appended so `$` and `\n` behave as
//! grammar authors expect; tokens never extend past the line itself.

use std::borrow::Cow;
use std::path::Path;

use onig::Region;

use crate::error::{GrammarError, TokenizeError};
use crate::grammar::compile::{Capture, EndPattern};
use crate::grammar::{CompiledGrammar, RawGrammar, Rule, RuleId};
use crate::pattern::{resolve_back_references, Pattern};
use crate::token::{Explanation, Token, Tokenize, TokenizeOptions, TokenizedText, LINE_SEPARATOR};

/// A loaded grammar, ready to tokenize any number of texts.
///
/// Construction compiles every pattern up front, so a malformed grammar
/// fails here rather than halfway through a run. The compiled grammar is
/// released when the `Highlighter` is dropped.
#[derive(Debug)]
pub struct Highlighter {
    grammar: CompiledGrammar,
}

impl Highlighter {
    pub fn from_path(path: &Path) -> Result<Self, GrammarError> {
        let json = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading grammar");
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw = RawGrammar::from_json(json)?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawGrammar) -> Result<Self, GrammarError> {
        Ok(Highlighter {
            grammar: CompiledGrammar::compile(raw)?,
        })
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }
}

impl Tokenize for Highlighter {
    fn root_scope(&self) -> &str {
        self.grammar.scope_name()
    }

    fn tokenize(
        &self,
        text: &str,
        options: TokenizeOptions,
    ) -> Result<TokenizedText, TokenizeError> {
        LineTokenizer {
            grammar: &self.grammar,
            line: 0,
        }
        .tokenize(text, options)
    }
}

impl Drop for Highlighter {
    fn drop(&mut self) {
        tracing::debug!(
            scope = %self.grammar.scope_name(),
            rules = self.grammar.rule_count(),
            "releasing tokenizer engine"
        );
    }
}

/// An active rule.
struct Frame {
    rule: RuleId,
    /// Scope depth before the rule's `name` was pushed.
    base_depth: usize,
    /// Scope depth after `name`, before `contentName`.
    name_depth: usize,
    /// `end`/`while` compiled from back-references into this frame's `begin`.
    resolved: Option<Pattern>,
    /// Position on the current line where the rule was entered.
    enter_pos: Option<usize>,
}

struct State {
    frames: Vec<Frame>,
    scopes: Vec<String>,
}

impl State {
    fn new(rule: RuleId, scopes: Vec<String>) -> Self {
        let depth = scopes.len();
        State {
            frames: vec![Frame {
                rule,
                base_depth: depth,
                name_depth: depth,
                resolved: None,
                enter_pos: None,
            }],
            scopes,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Candidate {
    End,
    Rule(RuleId),
}

/// The winning match at a position.
struct Found {
    kind: Candidate,
    start: usize,
    end: usize,
    groups: Vec<Option<(usize, usize)>>,
}

impl Found {
    fn from_region(kind: Candidate, region: &Region) -> Option<Self> {
        let (start, end) = region.pos(0)?;
        Some(Found {
            kind,
            start,
            end,
            groups: (0..region.len()).map(|group| region.pos(group)).collect(),
        })
    }
}

/// A `begin` match about to push a frame.
struct Opening<'g> {
    rule: RuleId,
    name: Option<&'g str>,
    content_name: Option<&'g str>,
    captures: &'g [Capture],
    close: &'g EndPattern,
}

/// Scoped spans of one line, relative to the line start.
struct LineTokens {
    line_len: usize,
    spans: Vec<Span>,
}

struct Span {
    start: usize,
    end: usize,
    scopes: Vec<String>,
}

impl LineTokens {
    fn new(line_len: usize) -> Self {
        LineTokens {
            line_len,
            spans: Vec::new(),
        }
    }

    /// Record `start..end` under `scopes`, clipped to the line and to what
    /// has already been recorded. Adjacent spans with equal scopes merge.
    fn push(&mut self, start: usize, end: usize, scopes: &[String]) {
        let covered = self.spans.last().map_or(0, |span| span.end);
        let start = start.max(covered);
        let end = end.min(self.line_len);
        if start >= end {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.end == start && last.scopes.as_slice() == scopes {
                last.end = end;
                return;
            }
        }
        self.spans.push(Span {
            start,
            end,
            scopes: scopes.to_vec(),
        });
    }

    fn into_tokens(self, line: &str, line_offset: usize, options: TokenizeOptions) -> Vec<Token> {
        self.spans
            .into_iter()
            .map(|span| {
                let content = line[span.start..span.end].to_string();
                let explanation = options.include_explanation.then(|| {
                    vec![Explanation {
                        content: content.clone(),
                        scopes: span.scopes,
                    }]
                });
                Token {
                    offset: line_offset + span.start,
                    content,
                    explanation,
                }
            })
            .collect()
    }
}

struct LineTokenizer<'g> {
    grammar: &'g CompiledGrammar,
    /// 1-based line being tokenized, for diagnostics.
    line: usize,
}

impl LineTokenizer<'_> {
    fn tokenize(
        &mut self,
        text: &str,
        options: TokenizeOptions,
    ) -> Result<TokenizedText, TokenizeError> {
        let mut state = State::new(
            self.grammar.root(),
            vec![self.grammar.scope_name().to_string()],
        );
        let mut lines = Vec::new();
        let mut line_offset = 0;

        for (index, line) in text.split(LINE_SEPARATOR).enumerate() {
            self.line = index + 1;
            for frame in &mut state.frames {
                frame.enter_pos = None;
            }

            let haystack = format!("{line}\n");
            let mut out = LineTokens::new(line.len());
            let pos = self.check_while(&haystack, &mut state, &mut out)?;
            self.scan(&haystack, pos, &mut state, &mut out)?;

            lines.push(out.into_tokens(line, line_offset, options));
            line_offset += line.len() + LINE_SEPARATOR.len();
        }

        Ok(TokenizedText::new(lines))
    }

    /// Re-check active `while` rules, outermost first, at the start of a
    /// line. The first one that fails is popped together with everything
    /// above it. Returns the position after the consumed `while` matches.
    fn check_while(
        &self,
        text: &str,
        state: &mut State,
        out: &mut LineTokens,
    ) -> Result<usize, TokenizeError> {
        let mut pos = 0;
        let mut region = Region::new();
        let mut index = 0;

        while index < state.frames.len() {
            let frame = &state.frames[index];
            let Rule::BeginWhile {
                while_,
                while_captures,
                ..
            } = self.grammar.rule(frame.rule)
            else {
                index += 1;
                continue;
            };

            let pattern = frame.resolved.as_ref().or_else(|| while_.fixed());
            let found = pattern
                .and_then(|pattern| pattern.search(text, pos, &mut region))
                .filter(|&start| start == pos)
                .and_then(|_| Found::from_region(Candidate::Rule(frame.rule), &region));

            if let Some(found) = found {
                let depth = frame.name_depth.min(state.scopes.len());
                let scopes = state.scopes[..depth].to_vec();
                self.emit_captures(text, &found, while_captures, &scopes, out)?;
                pos = found.end;
                index += 1;
            } else {
                tracing::trace!(line = self.line, index, "`while` condition failed");
                let base = frame.base_depth;
                state.scopes.truncate(base);
                state.frames.truncate(index);
                break;
            }
        }

        Ok(pos)
    }

    /// Tokenize `text[pos..]` under `state`, recording spans into `out`.
    fn scan(
        &self,
        text: &str,
        mut pos: usize,
        state: &mut State,
        out: &mut LineTokens,
    ) -> Result<(), TokenizeError> {
        let mut region = Region::new();

        loop {
            let Some(found) = self.best_match(text, pos, state, &mut region) else {
                out.push(pos, text.len(), &state.scopes);
                return Ok(());
            };
            out.push(pos, found.start, &state.scopes);
            let advanced = found.end > pos;

            match found.kind {
                Candidate::End => {
                    let Some(frame) = state.frames.pop() else {
                        out.push(found.start, text.len(), &state.scopes);
                        return Ok(());
                    };
                    state.scopes.truncate(frame.name_depth);
                    if let Rule::BeginEnd { end_captures, .. } = self.grammar.rule(frame.rule) {
                        self.emit_captures(text, &found, end_captures, &state.scopes, out)?;
                    }
                    state.scopes.truncate(frame.base_depth);

                    if !advanced && frame.enter_pos == Some(pos) {
                        tracing::trace!(
                            line = self.line,
                            pos,
                            "rule entered and left without advancing"
                        );
                        out.push(found.end, text.len(), &state.scopes);
                        return Ok(());
                    }
                }
                Candidate::Rule(id) => match self.grammar.rule(id) {
                    Rule::Match { name, captures, .. } => {
                        let depth = state.scopes.len();
                        let groups = group_texts(text, &found.groups);
                        push_scope_names(&mut state.scopes, name.as_deref(), &groups);
                        self.emit_captures(text, &found, captures, &state.scopes, out)?;
                        state.scopes.truncate(depth);

                        if !advanced {
                            out.push(found.end, text.len(), &state.scopes);
                            return Ok(());
                        }
                    }
                    Rule::BeginEnd {
                        name,
                        content_name,
                        begin_captures,
                        end,
                        ..
                    } => {
                        let opening = Opening {
                            rule: id,
                            name: name.as_deref(),
                            content_name: content_name.as_deref(),
                            captures: begin_captures,
                            close: end,
                        };
                        if self.enter(&opening, text, &found, pos, state, out)? {
                            return Ok(());
                        }
                    }
                    Rule::BeginWhile {
                        name,
                        content_name,
                        begin_captures,
                        while_,
                        ..
                    } => {
                        let opening = Opening {
                            rule: id,
                            name: name.as_deref(),
                            content_name: content_name.as_deref(),
                            captures: begin_captures,
                            close: while_,
                        };
                        if self.enter(&opening, text, &found, pos, state, out)? {
                            return Ok(());
                        }
                    }
                    Rule::Pending | Rule::Container { .. } => {
                        out.push(found.start, text.len(), &state.scopes);
                        return Ok(());
                    }
                },
            }

            pos = found.end;
        }
    }

    /// Push a frame for a `begin` match. Returns true when the rest of the
    /// line must be given up because the rule would re-enter itself without
    /// consuming input.
    fn enter(
        &self,
        opening: &Opening<'_>,
        text: &str,
        found: &Found,
        pos: usize,
        state: &mut State,
        out: &mut LineTokens,
    ) -> Result<bool, TokenizeError> {
        let reentered = found.end == pos
            && state
                .frames
                .iter()
                .rev()
                .take_while(|frame| frame.enter_pos == Some(pos))
                .any(|frame| frame.rule == opening.rule);
        if reentered {
            tracing::trace!(line = self.line, pos, "rule re-entered without advancing");
            out.push(found.start, text.len(), &state.scopes);
            return Ok(true);
        }

        let base_depth = state.scopes.len();
        let groups = group_texts(text, &found.groups);
        push_scope_names(&mut state.scopes, opening.name, &groups);
        self.emit_captures(text, found, opening.captures, &state.scopes, out)?;
        let name_depth = state.scopes.len();
        push_scope_names(&mut state.scopes, opening.content_name, &groups);

        let resolved = match opening.close {
            EndPattern::BackReferenced(source) => Some(self.resolve_close(source, &groups)?),
            EndPattern::Fixed(_) => None,
        };

        state.frames.push(Frame {
            rule: opening.rule,
            base_depth,
            name_depth,
            resolved,
            enter_pos: Some(pos),
        });
        Ok(false)
    }

    fn resolve_close(
        &self,
        source: &str,
        groups: &[Option<&str>],
    ) -> Result<Pattern, TokenizeError> {
        let resolved = resolve_back_references(source, groups);
        Pattern::new(&resolved).map_err(|error| TokenizeError::BackReference {
            line: self.line,
            pattern: resolved,
            message: error.to_string(),
        })
    }

    fn best_match(
        &self,
        text: &str,
        pos: usize,
        state: &State,
        region: &mut Region,
    ) -> Option<Found> {
        let frame = state.frames.last()?;
        let close = match self.grammar.rule(frame.rule) {
            Rule::BeginEnd {
                end,
                apply_end_pattern_last,
                ..
            } => frame
                .resolved
                .as_ref()
                .or_else(|| end.fixed())
                .map(|pattern| (pattern, *apply_end_pattern_last)),
            _ => None,
        };

        let mut best: Option<Found> = None;
        if let Some((pattern, false)) = close {
            consider(&mut best, Candidate::End, pattern, text, pos, region);
        }
        for &id in self.grammar.candidates(frame.rule) {
            if best.as_ref().is_some_and(|found| found.start == pos) {
                break;
            }
            if let Some(pattern) = self.grammar.rule(id).opening_pattern() {
                consider(&mut best, Candidate::Rule(id), pattern, text, pos, region);
            }
        }
        if let Some((pattern, true)) = close {
            consider(&mut best, Candidate::End, pattern, text, pos, region);
        }
        best
    }

    /// Record the span of `found`, split wherever a capture with a scope or
    /// nested patterns begins or ends.
    fn emit_captures(
        &self,
        text: &str,
        found: &Found,
        captures: &[Capture],
        scopes: &[String],
        out: &mut LineTokens,
    ) -> Result<(), TokenizeError> {
        if found.start == found.end {
            return Ok(());
        }
        if captures.is_empty() {
            out.push(found.start, found.end, scopes);
            return Ok(());
        }

        let groups = group_texts(text, &found.groups);

        // Captures that took part in the match. Anything nested inside a
        // capture with its own patterns is left to those patterns.
        let mut active: Vec<(usize, usize, &Capture)> = Vec::new();
        for capture in captures {
            let Some(Some((start, end))) = found.groups.get(capture.group).copied() else {
                continue;
            };
            let start = start.clamp(found.start, found.end);
            let end = end.clamp(found.start, found.end);
            if start >= end {
                continue;
            }
            let shadowed = active.iter().any(|&(outer_start, outer_end, outer)| {
                outer.patterns.is_some() && outer_start <= start && end <= outer_end
            });
            if !shadowed {
                active.push((start, end, capture));
            }
        }

        let mut bounds = vec![found.start, found.end];
        for &(start, end, _) in &active {
            bounds.push(start);
            bounds.push(end);
        }
        bounds.sort_unstable();
        bounds.dedup();

        for window in bounds.windows(2) {
            let (from, to) = (window[0], window[1]);
            let mut segment_scopes = scopes.to_vec();
            let mut nested = None;
            for &(start, end, capture) in &active {
                if start <= from && to <= end {
                    push_scope_names(&mut segment_scopes, capture.name.as_deref(), &groups);
                    if capture.patterns.is_some() {
                        nested = capture.patterns;
                    }
                }
            }
            match nested {
                Some(rule) => {
                    let mut inner = State::new(rule, segment_scopes);
                    self.scan(&text[..to], from, &mut inner, out)?;
                }
                None => out.push(from, to, &segment_scopes),
            }
        }
        Ok(())
    }
}

/// Keep `pattern`'s match if it starts strictly before the current best.
fn consider(
    best: &mut Option<Found>,
    kind: Candidate,
    pattern: &Pattern,
    text: &str,
    pos: usize,
    region: &mut Region,
) {
    let Some(start) = pattern.search(text, pos, region) else {
        return;
    };
    if best.as_ref().is_some_and(|current| current.start <= start) {
        return;
    }
    *best = Found::from_region(kind, region);
}

fn group_texts<'t>(text: &'t str, groups: &[Option<(usize, usize)>]) -> Vec<Option<&'t str>> {
    groups
        .iter()
        .map(|group| group.and_then(|(start, end)| text.get(start..end)))
        .collect()
}

/// Push the scopes named by `name` (space separated, `$n` expanded).
fn push_scope_names(scopes: &mut Vec<String>, name: Option<&str>, groups: &[Option<&str>]) {
    let Some(name) = name else {
        return;
    };
    let expanded = expand_captures(name, groups);
    scopes.extend(expanded.split_whitespace().map(str::to_string));
}

/// Expand `$n`, `${n}`, `${n:/downcase}` and `${n:/upcase}` in a scope name.
fn expand_captures<'n>(name: &'n str, groups: &[Option<&str>]) -> Cow<'n, str> {
    if !name.contains('$') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(index) = rest.find('$') {
        out.push_str(&rest[..index]);
        let after = &rest[index + 1..];

        let (reference, tail) = if let Some(inner) = after.strip_prefix('{') {
            match inner.find('}') {
                Some(close) => (&inner[..close], &inner[close + 1..]),
                None => ("", after),
            }
        } else {
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            (&after[..digits], &after[digits..])
        };
        let (group, modifier) = reference.split_once(':').unwrap_or((reference, ""));

        match group.parse::<usize>() {
            Ok(group) => {
                let text = groups.get(group).copied().flatten().unwrap_or("");
                match modifier {
                    "/downcase" => out.push_str(&text.to_lowercase()),
                    "/upcase" => out.push_str(&text.to_uppercase()),
                    _ => out.push_str(text),
                }
                rest = tail;
            }
            Err(_) => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
