//! HTML rendering from highlight spans.
//!
//! This module converts raw spans from grammar parsers into HTML with proper
//! handling of overlapping spans (deduplication) and span coalescing.
//!
//! # Span Coalescing
//!
//! Adjacent spans that map to the same theme slot are merged into a single HTML element.
//! For example, if we have:
//! - `keyword.function` at bytes 0-4
//! - `keyword` at bytes 5-8
//!
//! Both map to the keyword slot, so they become a single element.
//!
//! # Nesting
//!
//! Output is flat: at each position only the innermost span is emitted. A
//! string containing an escape renders as string, escape, string.

use crate::{HtmlFormat, Span};
use gloss_theme::{Theme, ThemeSlot, capture_to_slot};
use std::collections::HashMap;

/// Opening and closing markup for one slot.
fn make_html_tags(slot: ThemeSlot, format: &HtmlFormat, theme: &Theme) -> Option<(String, String)> {
    let span_close = || "</span>".to_string();
    match format {
        HtmlFormat::InlineStyles => {
            let css = theme.style(slot)?.to_css();
            if css.is_empty() {
                return None;
            }
            Some((format!("<span style=\"{css}\">"), span_close()))
        }
        HtmlFormat::CustomElements => {
            let tag = slot.tag()?;
            Some((format!("<a-{tag}>"), format!("</a-{tag}>")))
        }
        HtmlFormat::CustomElementsWithPrefix(prefix) => {
            let tag = slot.tag()?;
            Some((format!("<{prefix}-{tag}>"), format!("</{prefix}-{tag}>")))
        }
        HtmlFormat::ClassNames => {
            let name = slot.name()?;
            Some((format!("<span class=\"{name}\">"), span_close()))
        }
        HtmlFormat::ClassNamesWithPrefix(prefix) => {
            let name = slot.name()?;
            Some((format!("<span class=\"{prefix}-{name}\">"), span_close()))
        }
    }
}

/// A span resolved to its theme slot.
#[derive(Debug, Clone)]
struct NormalizedSpan {
    start: u32,
    end: u32,
    slot: ThemeSlot,
}

/// Normalize spans: map captures to theme slots and merge adjacent spans with same slot.
fn normalize_and_coalesce(spans: Vec<Span>) -> Vec<NormalizedSpan> {
    let mut normalized: Vec<NormalizedSpan> = spans
        .into_iter()
        .filter_map(|span| {
            let slot = capture_to_slot(&span.capture);
            (slot != ThemeSlot::None && span.start < span.end).then_some(NormalizedSpan {
                start: span.start,
                end: span.end,
                slot,
            })
        })
        .collect();

    normalized.sort_by_key(|s| (s.start, s.end));

    let mut coalesced: Vec<NormalizedSpan> = Vec::with_capacity(normalized.len());
    for span in normalized {
        if let Some(last) = coalesced.last_mut() {
            if span.slot == last.slot && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        }
        coalesced.push(span);
    }

    coalesced
}

/// Keep one span per exact `(start, end)` range.
///
/// Styled spans beat unstyled ones (`comment` over `spell`). Among equals, the
/// higher `pattern_index` wins.
fn dedupe(spans: Vec<Span>) -> Vec<Span> {
    let mut deduped: HashMap<(u32, u32), Span> = HashMap::new();
    for span in spans {
        let key = (span.start, span.end);
        let new_has_styling = capture_to_slot(&span.capture) != ThemeSlot::None;

        if let Some(existing) = deduped.get(&key) {
            let existing_has_styling = capture_to_slot(&existing.capture) != ThemeSlot::None;
            let should_replace = match (new_has_styling, existing_has_styling) {
                (true, false) => true,
                (false, true) => false,
                _ => span.pattern_index >= existing.pattern_index,
            };
            if should_replace {
                deduped.insert(key, span);
            }
        } else {
            deduped.insert(key, span);
        }
    }
    deduped.into_values().collect()
}

/// Deduplicate spans and convert to HTML.
///
/// This handles:
/// 1. Mapping captures to theme slots (many -> few)
/// 2. Coalescing adjacent spans with the same slot
/// 3. Handling overlapping spans
///
/// `theme` is only consulted for [`HtmlFormat::InlineStyles`]. Trailing
/// newlines are trimmed from the source so the output sits flush inside
/// `<pre><code>`.
pub fn spans_to_html(source: &str, spans: Vec<Span>, format: &HtmlFormat, theme: &Theme) -> String {
    let source = source.trim_end_matches('\n');

    if spans.is_empty() {
        return html_escape(source);
    }

    // Stable input order to the dedupe map, so ties resolve the same way every run.
    let mut spans = spans;
    spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut spans = normalize_and_coalesce(dedupe(spans));
    if spans.is_empty() {
        return html_escape(source);
    }

    // Longer spans first at the same start, so inner spans land on top of the stack.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let tags: HashMap<ThemeSlot, Option<(String, String)>> = spans
        .iter()
        .map(|s| (s.slot, make_html_tags(s.slot, format, theme)))
        .collect();

    // (pos, is_start, span_index)
    let mut events: Vec<(u32, bool, usize)> = Vec::with_capacity(spans.len() * 2);
    for (i, span) in spans.iter().enumerate() {
        events.push((span.start, true, i));
        events.push((span.end, false, i));
    }
    // Ends before starts at the same position.
    events.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut html = String::with_capacity(source.len() * 2);
    let mut last_pos: usize = 0;
    let mut stack: Vec<usize> = Vec::new();

    let emit = |html: &mut String, text: &str, top: Option<usize>| {
        let wrapper = top.and_then(|i| tags.get(&spans[i].slot)).and_then(|t| t.as_ref());
        match wrapper {
            Some((open, close)) => {
                html.push_str(open);
                html.push_str(&html_escape(text));
                html.push_str(close);
            }
            None => html.push_str(&html_escape(text)),
        }
    };

    for (pos, is_start, span_idx) in events {
        // Spans may run past the trimmed newlines.
        let pos = (pos as usize).min(source.len());

        if pos > last_pos && source.is_char_boundary(pos) {
            emit(&mut html, &source[last_pos..pos], stack.last().copied());
            last_pos = pos;
        }

        if is_start {
            stack.push(span_idx);
        } else if let Some(idx) = stack.iter().rposition(|&x| x == span_idx) {
            stack.remove(idx);
        }
    }

    if last_pos < source.len() {
        emit(&mut html, &source[last_pos..], stack.last().copied());
    }

    html
}

/// Escape HTML special characters.
pub fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
