//! Line-oriented TextMate tokenizer.
//!
//! Text is fed one line at a time, each line ending in `\n` (one is appended
//! to a final line that lacks it). A stack of open begin/end and begin/while
//! rules carries state from line to line. Scopes of an open rule are emitted
//! when the rule closes, so spans may cover several lines.

use super::compile::{Captures, EndPattern, ROOT, Rule, RuleId, RuleKind, build_regex};
use crate::types::Span;
use fancy_regex::{Captures as RegexCaptures, Regex};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Give up on a line after this many matches that do not advance.
const MAX_STALLED: usize = 16;

struct Frame {
    rule: RuleId,
    /// Absolute offset where the begin match starts.
    start: usize,
    /// Absolute offset where the begin match ends.
    content_start: usize,
    name: Option<String>,
    content_name: Option<String>,
    /// End (or while) pattern with back-references already filled in.
    resolved: Option<Regex>,
    depth: u32,
}

enum Next<'t> {
    End(RegexCaptures<'t>),
    Rule(RuleId, RegexCaptures<'t>),
}

impl Next<'_> {
    fn captures(&self) -> &RegexCaptures<'_> {
        match self {
            Next::End(caps) | Next::Rule(_, caps) => caps,
        }
    }

    fn start(&self) -> usize {
        self.captures().get(0).map_or(0, |m| m.start())
    }
}

struct Sink {
    spans: Vec<Span>,
    text_len: usize,
}

impl Sink {
    /// Emit one span per space-separated scope in `name`.
    fn scopes(&mut self, name: &str, start: usize, end: usize, depth: u32) {
        let end = end.min(self.text_len);
        if start >= end {
            return;
        }
        for scope in name.split_whitespace() {
            self.spans.push(Span {
                start: start as u32,
                end: end as u32,
                capture: scope.to_string(),
                pattern_index: depth,
            });
        }
    }

    fn captures(&mut self, offset: usize, caps: &RegexCaptures<'_>, rules: &Captures, depth: u32) {
        for (group, rule) in rules.iter().enumerate() {
            let Some(name) = rule.as_ref().and_then(|r| r.name.as_deref()) else {
                continue;
            };
            let Some(m) = caps.get(group) else {
                continue;
            };
            let name = substitute(name, caps);
            self.scopes(&name, offset + m.start(), offset + m.end(), depth);
        }
    }

    fn close(&mut self, frame: &Frame, content_end: usize, end: usize) {
        if let Some(content_name) = &frame.content_name {
            self.scopes(content_name, frame.content_start, content_end, frame.depth);
        }
        if let Some(name) = &frame.name {
            self.scopes(name, frame.start, end, frame.depth);
        }
    }
}

struct Tokenizer<'r> {
    rules: &'r [Rule],
    stack: Vec<Frame>,
    sink: Sink,
}

/// Tokenize `text` and return spans with absolute byte offsets.
pub(crate) fn tokenize(rules: &[Rule], text: &str) -> Vec<Span> {
    let mut tokenizer = Tokenizer {
        rules,
        stack: Vec::new(),
        sink: Sink {
            spans: Vec::new(),
            text_len: text.len(),
        },
    };

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.ends_with('\n') {
            tokenizer.line(offset, line);
        } else {
            tokenizer.line(offset, &format!("{line}\n"));
        }
        offset += line.len();
    }

    while let Some(frame) = tokenizer.stack.pop() {
        tokenizer.sink.close(&frame, text.len(), text.len());
    }

    tokenizer.sink.spans
}

impl<'r> Tokenizer<'r> {
    fn depth(&self) -> u32 {
        self.stack.len() as u32 + 1
    }

    fn line(&mut self, offset: usize, line: &str) {
        let mut pos = self.check_while_rules(offset, line);
        let mut stalled = 0;
        // A rule closed by an empty end match may not reopen at the same spot.
        let mut reopen_blocked: Option<RuleId> = None;

        while pos < line.len() {
            let Some(next) = self.find_next(line, pos, reopen_blocked) else {
                break;
            };
            let Some(m) = next.captures().get(0) else {
                break;
            };
            let (start, end) = (m.start(), m.end());

            match next {
                Next::End(caps) => {
                    let Some(frame) = self.stack.pop() else {
                        break;
                    };
                    if let RuleKind::BeginEnd { end_captures, .. } = &self.rules[frame.rule].kind {
                        self.sink.captures(offset, &caps, end_captures, frame.depth + 1);
                    }
                    self.sink.close(&frame, offset + start, offset + end);
                    if end == pos {
                        reopen_blocked = Some(frame.rule);
                    }
                }
                Next::Rule(id, caps) => self.apply(id, offset, start, end, &caps),
            }

            if end > pos {
                pos = end;
                stalled = 0;
                reopen_blocked = None;
            } else {
                stalled += 1;
                if stalled > MAX_STALLED {
                    debug!(offset = offset + pos, "TextMate rules stopped advancing; rest of line unscoped");
                    break;
                }
            }
        }
    }

    fn apply(&mut self, id: RuleId, offset: usize, start: usize, end: usize, caps: &RegexCaptures<'_>) {
        let rules = self.rules;
        let rule = &rules[id];
        let depth = self.depth();
        let name = rule.name.as_deref().map(|n| substitute(n, caps).into_owned());

        let (begin_captures, resolved) = match &rule.kind {
            RuleKind::Match { captures, .. } => {
                if let Some(name) = &name {
                    self.sink.scopes(name, offset + start, offset + end, depth);
                }
                self.sink.captures(offset, caps, captures, depth + 1);
                return;
            }
            RuleKind::BeginEnd {
                end: end_pattern,
                begin_captures,
                ..
            } => (
                begin_captures,
                end_pattern.as_ref().and_then(|p| resolve(p, caps)),
            ),
            RuleKind::BeginWhile {
                while_,
                begin_captures,
                ..
            } => (begin_captures, resolve(while_, caps)),
            RuleKind::Container => return,
        };

        self.sink.captures(offset, caps, begin_captures, depth + 1);
        self.stack.push(Frame {
            rule: id,
            start: offset + start,
            content_start: offset + end,
            name,
            content_name: rule
                .content_name
                .as_deref()
                .map(|n| substitute(n, caps).into_owned()),
            resolved,
            depth,
        });
    }

    /// The pattern that ends (or continues) a frame.
    fn frame_regex<'a>(&'a self, frame: &'a Frame) -> Option<&'a Regex> {
        if let Some(regex) = &frame.resolved {
            return Some(regex);
        }
        match &self.rules[frame.rule].kind {
            RuleKind::BeginEnd {
                end: Some(EndPattern::Static(regex)),
                ..
            }
            | RuleKind::BeginWhile {
                while_: EndPattern::Static(regex),
                ..
            } => Some(regex),
            _ => None,
        }
    }

    /// At the start of a line, every open begin/while rule must match again or close.
    fn check_while_rules(&mut self, offset: usize, line: &str) -> usize {
        let mut pos = 0;
        for i in 0..self.stack.len() {
            let frame = &self.stack[i];
            let RuleKind::BeginWhile { while_captures, .. } = &self.rules[frame.rule].kind else {
                continue;
            };

            let caps = self
                .frame_regex(frame)
                .and_then(|regex| search(regex, line, pos))
                .filter(|caps| caps.get(0).is_some_and(|m| m.start() == pos));

            match caps {
                Some(caps) => {
                    self.sink.captures(offset, &caps, while_captures, frame.depth + 1);
                    pos = caps.get(0).map_or(pos, |m| m.end());
                }
                None => {
                    while self.stack.len() > i {
                        if let Some(frame) = self.stack.pop() {
                            self.sink.close(&frame, offset + pos, offset + pos);
                        }
                    }
                    break;
                }
            }
        }
        pos
    }

    /// The earliest match at or after `pos`: the top frame's end pattern or one
    /// of its patterns. Ties go to the end pattern unless `applyEndPatternLast`
    /// is set, then to the earlier pattern in the list.
    fn find_next<'t>(&self, line: &'t str, pos: usize, blocked: Option<RuleId>) -> Option<Next<'t>> {
        let top = self.stack.last();
        let rule = &self.rules[top.map_or(ROOT, |f| f.rule)];

        let apply_end_last = matches!(
            rule.kind,
            RuleKind::BeginEnd {
                apply_end_pattern_last: true,
                ..
            }
        );
        let end_match = match (top, &rule.kind) {
            (Some(frame), RuleKind::BeginEnd { .. }) => self
                .frame_regex(frame)
                .and_then(|regex| search(regex, line, pos))
                .map(Next::End),
            _ => None,
        };

        let (mut best, deferred_end) = if apply_end_last {
            (None, end_match)
        } else {
            (end_match, None)
        };

        for &id in &rule.candidates {
            if best.as_ref().is_some_and(|b| b.start() == pos) {
                break;
            }
            let candidate = &self.rules[id];
            let Some(regex) = candidate.start_regex() else {
                continue;
            };
            let Some(caps) = search(regex, line, pos) else {
                continue;
            };
            let Some(m) = caps.get(0) else {
                continue;
            };
            if m.start() == m.end() {
                let reopening = m.start() == pos && blocked == Some(id);
                if reopening || !self.may_enter_empty(id, &candidate.kind) {
                    continue;
                }
            }
            if best.as_ref().is_none_or(|b| m.start() < b.start()) {
                best = Some(Next::Rule(id, caps));
            }
        }

        if let Some(end) = deferred_end {
            if best.as_ref().is_none_or(|b| end.start() < b.start()) {
                best = Some(end);
            }
        }

        best
    }

    /// Empty matches scope nothing. An empty begin may open a rule, but not the
    /// same rule that is already on top of the stack.
    fn may_enter_empty(&self, id: RuleId, kind: &RuleKind) -> bool {
        match kind {
            RuleKind::Match { .. } | RuleKind::Container => false,
            _ => self.stack.last().is_none_or(|f| f.rule != id),
        }
    }
}

fn search<'t>(regex: &Regex, line: &'t str, pos: usize) -> Option<RegexCaptures<'t>> {
    match regex.captures_from_pos(line, pos) {
        Ok(caps) => caps,
        Err(e) => {
            warn!(pattern = regex.as_str(), error = %e, "TextMate regex failed to run");
            None
        }
    }
}

/// Fill `\N` back-references in an end or while pattern with the escaped text
/// of the begin captures.
fn resolve(pattern: &EndPattern, caps: &RegexCaptures<'_>) -> Option<Regex> {
    let EndPattern::BackReferencing(source) = pattern else {
        return None;
    };

    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() && d != '0' => {
                chars.next();
                let group = d.to_digit(10).map_or(0, |g| g as usize);
                if let Some(m) = caps.get(group) {
                    out.push_str(&fancy_regex::escape(m.as_str()));
                }
            }
            Some(other) => {
                chars.next();
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    match build_regex(&out) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern = %out, error = %e, "resolved end pattern does not compile");
            None
        }
    }
}

/// Replace `$N` and `${N}` in a scope name with capture text.
fn substitute<'a>(name: &'a str, caps: &RegexCaptures<'_>) -> Cow<'a, str> {
    if !name.contains('$') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(i) = rest.find('$') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        let (digits, tail) = match after.strip_prefix('{') {
            Some(inner) => match inner.find('}') {
                Some(j) => (&inner[..j], &inner[j + 1..]),
                None => ("", after),
            },
            None => {
                let n = after.bytes().take_while(u8::is_ascii_digit).count();
                (&after[..n], &after[n..])
            }
        };
        match digits.parse::<usize>() {
            Ok(group) => {
                if let Some(m) = caps.get(group) {
                    out.push_str(m.as_str());
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
