//! Compile a [`RawGrammar`] into a flat rule table.
//!
//! Every rule gets a [`RuleId`] into one `Vec<Rule>`. Includes are resolved
//! here, so the tokenizer only ever follows ids. Rule 0 is the grammar root,
//! which is what `$self` and `$base` point at.

use super::grammar::{RawCaptures, RawGrammar, RawRule};
use fancy_regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub(crate) type RuleId = usize;

pub(crate) const ROOT: RuleId = 0;

#[derive(Debug)]
pub(crate) struct CaptureRule {
    pub name: Option<String>,
}

/// Indexed by capture group number.
pub(crate) type Captures = Vec<Option<CaptureRule>>;

#[derive(Debug)]
pub(crate) enum EndPattern {
    Static(Regex),
    /// Refers to begin captures with `\1`..`\9`. Resolved each time the rule begins.
    BackReferencing(String),
}

#[derive(Debug)]
pub(crate) enum RuleKind {
    Match {
        regex: Regex,
        captures: Captures,
    },
    BeginEnd {
        begin: Regex,
        /// `None` when the grammar gives no `end`: the rule runs to the end of input.
        end: Option<EndPattern>,
        begin_captures: Captures,
        end_captures: Captures,
        apply_end_pattern_last: bool,
    },
    BeginWhile {
        begin: Regex,
        while_: EndPattern,
        begin_captures: Captures,
        while_captures: Captures,
    },
    /// A bare `patterns` list.
    Container,
}

#[derive(Debug)]
pub(crate) struct Rule {
    pub name: Option<String>,
    pub content_name: Option<String>,
    pub kind: RuleKind,
    pub patterns: Vec<RuleId>,
    /// `patterns` with containers expanded, in order, without duplicates.
    pub candidates: Vec<RuleId>,
}

impl Rule {
    fn placeholder() -> Self {
        Self {
            name: None,
            content_name: None,
            kind: RuleKind::Container,
            patterns: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// The regex that starts this rule, if it is matchable.
    pub fn start_regex(&self) -> Option<&Regex> {
        match &self.kind {
            RuleKind::Match { regex, .. } => Some(regex),
            RuleKind::BeginEnd { begin, .. } | RuleKind::BeginWhile { begin, .. } => Some(begin),
            RuleKind::Container => None,
        }
    }
}

type Repository = HashMap<String, RawRule>;

struct Compiler<'g> {
    grammar: &'g RawGrammar,
    rules: Vec<Rule>,
    /// Keyed by the address of the raw rule, so recursive includes terminate.
    memo: HashMap<*const RawRule, RuleId>,
}

/// Compile all rules reachable from the grammar's top-level patterns.
pub(crate) fn compile(grammar: &RawGrammar) -> Vec<Rule> {
    let mut compiler = Compiler {
        grammar,
        rules: vec![Rule::placeholder()],
        memo: HashMap::new(),
    };

    let scopes = [&grammar.repository];
    let patterns = compiler.compile_patterns(&grammar.patterns, &scopes);
    compiler.rules[ROOT].patterns = patterns;

    let mut rules = compiler.rules;
    let candidates: Vec<Vec<RuleId>> = rules
        .iter()
        .map(|rule| {
            let mut out = Vec::new();
            let mut seen = HashSet::new();
            expand(&rules, &rule.patterns, &mut out, &mut seen);
            out
        })
        .collect();
    for (rule, candidates) in rules.iter_mut().zip(candidates) {
        rule.candidates = candidates;
    }
    rules
}

fn expand(rules: &[Rule], patterns: &[RuleId], out: &mut Vec<RuleId>, seen: &mut HashSet<RuleId>) {
    for &id in patterns {
        if !seen.insert(id) {
            continue;
        }
        match rules[id].kind {
            RuleKind::Container => expand(rules, &rules[id].patterns, out, seen),
            _ => out.push(id),
        }
    }
}

impl<'g> Compiler<'g> {
    fn compile_patterns(&mut self, patterns: &'g [RawRule], scopes: &[&'g Repository]) -> Vec<RuleId> {
        patterns
            .iter()
            .filter_map(|raw| self.compile_rule(raw, scopes))
            .collect()
    }

    fn compile_rule(&mut self, raw: &'g RawRule, scopes: &[&'g Repository]) -> Option<RuleId> {
        if let Some(include) = &raw.include {
            return self.resolve_include(include, scopes);
        }
        if raw.disabled {
            return None;
        }

        let key = raw as *const RawRule;
        if let Some(&id) = self.memo.get(&key) {
            return Some(id);
        }

        let id = self.rules.len();
        self.rules.push(Rule::placeholder());
        self.memo.insert(key, id);

        let kind = match compile_kind(raw) {
            Some(kind) => kind,
            None => {
                // Leave an empty container behind so includes of it stay valid.
                return Some(id);
            }
        };

        let mut inner: Vec<&'g Repository> = scopes.to_vec();
        if let Some(repository) = &raw.repository {
            inner.push(repository);
        }
        let patterns = match kind {
            RuleKind::Match { .. } => Vec::new(),
            _ => self.compile_patterns(&raw.patterns, &inner),
        };

        self.rules[id] = Rule {
            name: raw.name.clone(),
            content_name: raw.content_name.clone(),
            kind,
            patterns,
            candidates: Vec::new(),
        };
        Some(id)
    }

    fn resolve_include(&mut self, include: &str, scopes: &[&'g Repository]) -> Option<RuleId> {
        if include == "$self" || include == "$base" {
            return Some(ROOT);
        }
        if let Some(key) = include.strip_prefix('#') {
            return self.lookup(key, scopes);
        }

        let grammar = self.grammar;
        let (scope, fragment) = match include.split_once('#') {
            Some((scope, fragment)) => (scope, Some(fragment)),
            None => (include, None),
        };
        if scope != grammar.scope_name {
            debug!(include, "include of another grammar ignored");
            return None;
        }
        match fragment {
            Some(key) => self.lookup(key, &[&grammar.repository]),
            None => Some(ROOT),
        }
    }

    /// Find `key` in the innermost repository that defines it.
    fn lookup(&mut self, key: &str, scopes: &[&'g Repository]) -> Option<RuleId> {
        for depth in (0..scopes.len()).rev() {
            let repository: &'g Repository = scopes[depth];
            if let Some(raw) = repository.get(key) {
                return self.compile_rule(raw, &scopes[..=depth]);
            }
        }
        debug!(key, "include of unknown repository entry ignored");
        None
    }
}

fn compile_kind(raw: &RawRule) -> Option<RuleKind> {
    if let Some(pattern) = &raw.match_ {
        return Some(RuleKind::Match {
            regex: compile_regex(pattern)?,
            captures: compile_captures(raw.captures.as_ref()),
        });
    }

    let Some(begin) = &raw.begin else {
        return Some(RuleKind::Container);
    };
    let begin = compile_regex(begin)?;
    let begin_captures = compile_captures(raw.begin_captures.as_ref().or(raw.captures.as_ref()));

    if let Some(while_) = &raw.while_ {
        return Some(RuleKind::BeginWhile {
            begin,
            while_: compile_end(while_)?,
            begin_captures,
            while_captures: compile_captures(raw.while_captures.as_ref().or(raw.captures.as_ref())),
        });
    }

    let end = match &raw.end {
        Some(end) => Some(compile_end(end)?),
        None => None,
    };
    Some(RuleKind::BeginEnd {
        begin,
        end,
        begin_captures,
        end_captures: compile_captures(raw.end_captures.as_ref().or(raw.captures.as_ref())),
        apply_end_pattern_last: raw.apply_end_pattern_last,
    })
}

/// Compile a TextMate pattern. `^` and `$` are line anchors in TextMate.
pub(crate) fn build_regex(pattern: &str) -> Result<Regex, fancy_regex::Error> {
    Regex::new(&format!("(?m){pattern}"))
}

fn compile_regex(pattern: &str) -> Option<Regex> {
    match build_regex(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern, error = %e, "TextMate rule disabled: regex does not compile");
            None
        }
    }
}

fn compile_end(pattern: &str) -> Option<EndPattern> {
    if has_back_references(pattern) {
        Some(EndPattern::BackReferencing(pattern.to_string()))
    } else {
        compile_regex(pattern).map(EndPattern::Static)
    }
}

fn compile_captures(raw: Option<&RawCaptures>) -> Captures {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let mut captures: Captures = Vec::new();
    for (key, capture) in raw {
        let Ok(group) = key.parse::<usize>() else {
            debug!(key, "non-numeric capture key ignored");
            continue;
        };
        if captures.len() <= group {
            captures.resize_with(group + 1, || None);
        }
        captures[group] = Some(CaptureRule {
            name: capture.name.clone(),
        });
    }
    captures
}

/// True if the pattern contains `\1`..`\9` outside of an escaped backslash.
pub(crate) fn has_back_references(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(d) if d.is_ascii_digit() && d != '0' => return true,
                _ => {}
            }
        }
    }
    false
}
