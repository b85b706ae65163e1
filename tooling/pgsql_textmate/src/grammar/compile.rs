//! Compile a [`RawGrammar`] into an arena of rules with resolved includes.
//!
//! Includes are resolved once, here: `#name` against the nearest enclosing
//! `repository` that defines `name` (innermost first, then outward to the
//! grammar), `$self`/`$base` against the grammar's root rule. Each
//! repository entry is compiled at most once, so recursive grammars
//! (a group that includes `$self`, a comment that includes itself) become
//! cycles in the arena rather than infinite expansion.

use rustc_hash::{FxHashMap, FxHashSet};

use super::raw::{RawCaptures, RawGrammar, RawRule, Repository};
use crate::error::GrammarError;
use crate::pattern::{has_back_references, Pattern};

/// Index of a rule in [`CompiledGrammar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        RuleId(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// A capture group's scope and optional nested patterns.
#[derive(Debug)]
pub struct Capture {
    pub group: usize,
    pub name: Option<String>,
    /// Container rule whose patterns re-tokenize the captured text.
    pub patterns: Option<RuleId>,
}

/// The closing pattern of a `begin`/`end` or `begin`/`while` rule.
#[derive(Debug)]
pub enum EndPattern {
    Fixed(Pattern),
    /// Refers to `begin` groups; compiled per match once their text is known.
    BackReferenced(String),
}

impl EndPattern {
    pub fn fixed(&self) -> Option<&Pattern> {
        match self {
            EndPattern::Fixed(pattern) => Some(pattern),
            EndPattern::BackReferenced(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum Rule {
    /// Reserved slot while a rule's body is being compiled.
    Pending,
    /// Only groups other rules (the root, repository entries that hold just
    /// `patterns`, capture patterns).
    Container { patterns: Vec<RuleId> },
    Match {
        name: Option<String>,
        pattern: Pattern,
        captures: Vec<Capture>,
    },
    BeginEnd {
        name: Option<String>,
        content_name: Option<String>,
        begin: Pattern,
        begin_captures: Vec<Capture>,
        end: EndPattern,
        end_captures: Vec<Capture>,
        patterns: Vec<RuleId>,
        apply_end_pattern_last: bool,
    },
    BeginWhile {
        name: Option<String>,
        content_name: Option<String>,
        begin: Pattern,
        begin_captures: Vec<Capture>,
        while_: EndPattern,
        while_captures: Vec<Capture>,
        patterns: Vec<RuleId>,
    },
}

impl Rule {
    /// The pattern that starts this rule, if it can start one.
    pub fn opening_pattern(&self) -> Option<&Pattern> {
        match self {
            Rule::Match { pattern, .. } => Some(pattern),
            Rule::BeginEnd { begin, .. } | Rule::BeginWhile { begin, .. } => Some(begin),
            Rule::Pending | Rule::Container { .. } => None,
        }
    }

    fn patterns(&self) -> &[RuleId] {
        match self {
            Rule::Container { patterns }
            | Rule::BeginEnd { patterns, .. }
            | Rule::BeginWhile { patterns, .. } => patterns,
            Rule::Pending | Rule::Match { .. } => &[],
        }
    }
}

/// A grammar ready for tokenization.
#[derive(Debug)]
pub struct CompiledGrammar {
    name: Option<String>,
    scope_name: String,
    root: RuleId,
    rules: Vec<Rule>,
    /// Per rule: its patterns with containers expanded, in priority order.
    candidates: Vec<Vec<RuleId>>,
}

impl CompiledGrammar {
    pub fn compile(raw: &RawGrammar) -> Result<Self, GrammarError> {
        let scope_name = raw
            .scope_name
            .clone()
            .ok_or(GrammarError::MissingScopeName)?;

        let mut compiler = Compiler::default();
        let root = compiler.reserve();
        let chain = vec![RepositoryScope {
            repository: &raw.repository,
            prefix: String::new(),
        }];
        let patterns = compiler.compile_patterns(&raw.patterns, &chain, &scope_name)?;
        compiler.rules[root.index()] = Rule::Container { patterns };

        let rules = compiler.rules;
        let candidates = rules
            .iter()
            .map(|rule| flatten(&rules, rule.patterns()))
            .collect();

        tracing::debug!(scope = %scope_name, rules = rules.len(), "compiled grammar");

        Ok(CompiledGrammar {
            name: raw.name.clone(),
            scope_name,
            root,
            rules,
            candidates,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn root(&self) -> RuleId {
        self.root
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules to try while `id` is the innermost active rule.
    pub fn candidates(&self, id: RuleId) -> &[RuleId] {
        &self.candidates[id.index()]
    }
}

/// Expand containers so only rules with an opening pattern remain. A rule
/// reached twice keeps its first (higher priority) position.
fn flatten(rules: &[Rule], patterns: &[RuleId]) -> Vec<RuleId> {
    fn visit(rules: &[Rule], id: RuleId, seen: &mut FxHashSet<RuleId>, out: &mut Vec<RuleId>) {
        if !seen.insert(id) {
            return;
        }
        match &rules[id.index()] {
            Rule::Container { patterns } => {
                for &child in patterns {
                    visit(rules, child, seen, out);
                }
            }
            Rule::Pending => {}
            _ => out.push(id),
        }
    }

    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for &id in patterns {
        visit(rules, id, &mut seen, &mut out);
    }
    out
}

/// A repository visible from the rule being compiled.
#[derive(Clone)]
struct RepositoryScope<'r> {
    repository: &'r Repository,
    /// Unique key prefix for entries of this repository.
    prefix: String,
}

#[derive(Default)]
struct Compiler {
    rules: Vec<Rule>,
    /// Repository entries already compiled, by `prefix/name`.
    entries: FxHashMap<String, RuleId>,
    anonymous_repositories: usize,
}

impl Compiler {
    fn reserve(&mut self) -> RuleId {
        let id = RuleId::from_index(self.rules.len());
        self.rules.push(Rule::Pending);
        id
    }

    fn compile_patterns<'r>(
        &mut self,
        raws: &'r [RawRule],
        chain: &[RepositoryScope<'r>],
        context: &str,
    ) -> Result<Vec<RuleId>, GrammarError> {
        let mut ids = Vec::with_capacity(raws.len());
        for raw in raws {
            if raw.disabled {
                continue;
            }
            if let Some(include) = &raw.include {
                if let Some(id) = self.resolve_include(include, chain, context)? {
                    ids.push(id);
                }
            } else {
                let id = self.reserve();
                self.compile_rule(id, raw, chain, context)?;
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn resolve_include(
        &mut self,
        include: &str,
        chain: &[RepositoryScope<'_>],
        context: &str,
    ) -> Result<Option<RuleId>, GrammarError> {
        if include == "$self" || include == "$base" {
            return Ok(Some(RuleId::from_index(0)));
        }
        let Some(name) = include.strip_prefix('#') else {
            tracing::debug!(include, "ignoring include of another grammar");
            return Ok(None);
        };

        for depth in (0..chain.len()).rev() {
            let scope = &chain[depth];
            let Some(entry) = scope.repository.get(name) else {
                continue;
            };
            let key = format!("{}/{name}", scope.prefix);
            if let Some(&id) = self.entries.get(&key) {
                return Ok(Some(id));
            }
            let id = self.reserve();
            self.entries.insert(key.clone(), id);
            let visible = &chain[..=depth];
            if entry.include.is_some() {
                // An entry that is itself just an include.
                let patterns = self.compile_patterns(std::slice::from_ref(entry), visible, name)?;
                self.rules[id.index()] = Rule::Container { patterns };
            } else {
                self.compile_entry(id, entry, visible, &key, name)?;
            }
            return Ok(Some(id));
        }

        tracing::warn!(
            include,
            context,
            "dropping include of unknown repository entry"
        );
        Ok(None)
    }

    fn compile_entry<'r>(
        &mut self,
        id: RuleId,
        raw: &'r RawRule,
        chain: &[RepositoryScope<'r>],
        key: &str,
        context: &str,
    ) -> Result<(), GrammarError> {
        if raw.repository.is_empty() {
            return self.compile_rule_in(id, raw, chain, context);
        }
        let mut inner = chain.to_vec();
        inner.push(RepositoryScope {
            repository: &raw.repository,
            prefix: key.to_string(),
        });
        self.compile_rule_in(id, raw, &inner, context)
    }

    fn compile_rule<'r>(
        &mut self,
        id: RuleId,
        raw: &'r RawRule,
        chain: &[RepositoryScope<'r>],
        context: &str,
    ) -> Result<(), GrammarError> {
        if raw.repository.is_empty() {
            return self.compile_rule_in(id, raw, chain, context);
        }
        self.anonymous_repositories += 1;
        let key = format!("@{}", self.anonymous_repositories);
        self.compile_entry(id, raw, chain, &key, context)
    }

    /// Compile `raw` into the reserved slot `id`, with `chain` already
    /// including `raw`'s own repository.
    fn compile_rule_in<'r>(
        &mut self,
        id: RuleId,
        raw: &'r RawRule,
        chain: &[RepositoryScope<'r>],
        context: &str,
    ) -> Result<(), GrammarError> {
        let context = raw.name.as_deref().unwrap_or(context);
        let rule = if let Some(source) = &raw.match_ {
            Rule::Match {
                name: raw.name.clone(),
                pattern: compile_pattern(source, context)?,
                captures: self.compile_captures(&raw.captures, chain, context)?,
            }
        } else if let (Some(begin), Some(end)) = (&raw.begin, &raw.end) {
            Rule::BeginEnd {
                name: raw.name.clone(),
                content_name: raw.content_name.clone(),
                begin: compile_pattern(begin, context)?,
                begin_captures: self.compile_captures(
                    or_shared(&raw.begin_captures, &raw.captures),
                    chain,
                    context,
                )?,
                end: compile_end_pattern(end, context)?,
                end_captures: self.compile_captures(
                    or_shared(&raw.end_captures, &raw.captures),
                    chain,
                    context,
                )?,
                patterns: self.compile_patterns(&raw.patterns, chain, context)?,
                apply_end_pattern_last: raw.apply_end_pattern_last,
            }
        } else if let (Some(begin), Some(while_)) = (&raw.begin, &raw.while_) {
            Rule::BeginWhile {
                name: raw.name.clone(),
                content_name: raw.content_name.clone(),
                begin: compile_pattern(begin, context)?,
                begin_captures: self.compile_captures(
                    or_shared(&raw.begin_captures, &raw.captures),
                    chain,
                    context,
                )?,
                while_: compile_end_pattern(while_, context)?,
                while_captures: self.compile_captures(
                    or_shared(&raw.while_captures, &raw.captures),
                    chain,
                    context,
                )?,
                patterns: self.compile_patterns(&raw.patterns, chain, context)?,
            }
        } else {
            if raw.begin.is_some() {
                tracing::warn!(
                    context,
                    "`begin` without `end` or `while`; treating as a group"
                );
            }
            Rule::Container {
                patterns: self.compile_patterns(&raw.patterns, chain, context)?,
            }
        };
        self.rules[id.index()] = rule;
        Ok(())
    }

    fn compile_captures<'r>(
        &mut self,
        raw: &'r RawCaptures,
        chain: &[RepositoryScope<'r>],
        context: &str,
    ) -> Result<Vec<Capture>, GrammarError> {
        let mut captures = Vec::with_capacity(raw.len());
        for (key, rule) in raw {
            let Ok(group) = key.parse::<usize>() else {
                tracing::warn!(context, key = %key, "ignoring non-numeric capture key");
                continue;
            };
            let patterns = if rule.patterns.is_empty() {
                None
            } else {
                let id = self.reserve();
                let patterns = self.compile_patterns(&rule.patterns, chain, context)?;
                self.rules[id.index()] = Rule::Container { patterns };
                Some(id)
            };
            captures.push(Capture {
                group,
                name: rule.name.clone(),
                patterns,
            });
        }
        // Outer groups open first, so group order is nesting order.
        captures.sort_by_key(|capture| capture.group);
        Ok(captures)
    }
}

/// `beginCaptures`/`endCaptures`/`whileCaptures` fall back to `captures`.
fn or_shared<'r>(specific: &'r RawCaptures, shared: &'r RawCaptures) -> &'r RawCaptures {
    if specific.is_empty() {
        shared
    } else {
        specific
    }
}

fn compile_pattern(source: &str, rule: &str) -> Result<Pattern, GrammarError> {
    Pattern::new(source).map_err(|error| GrammarError::Regex {
        rule: rule.to_string(),
        pattern: source.to_string(),
        message: error.to_string(),
    })
}

fn compile_end_pattern(source: &str, rule: &str) -> Result<EndPattern, GrammarError> {
    if has_back_references(source) {
        Ok(EndPattern::BackReferenced(source.to_string()))
    } else {
        compile_pattern(source, rule).map(EndPattern::Fixed)
    }
}
