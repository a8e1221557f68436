//! TextMate grammar implementation.
//!
//! Loads a grammar in the JSON form used by VS Code and shiki
//! (`*.tmLanguage.json`), compiles it into a rule table, and tokenizes text
//! line by line. Scopes are reported as span captures, for example
//! `keyword.control.janet`. [`gloss_theme::capture_to_slot`] folds them into
//! theme slots at render time.
//!
//! Supported: `match`, `begin`/`end`, `begin`/`while`, `captures`,
//! `beginCaptures`, `endCaptures`, `whileCaptures`, `name`, `contentName`,
//! `applyEndPatternLast`, `disabled`, nested `patterns` and `repository`, and
//! `include` of `#rule`, `$self`, `$base` and the grammar's own scope.
//! Back-references (`\1`) in `end` and `while` patterns refer to the begin
//! captures.
//!
//! Not supported: includes of other grammars (ignored), sub-patterns inside
//! captures (the capture still gets its scope), and `injections`, which are
//! parsed and ignored.

mod compile;
mod grammar;
mod tokenizer;

pub use grammar::{RawCapture, RawCaptures, RawGrammar, RawRule};

use crate::{Grammar, ParseResult};
use compile::Rule;
use std::fmt;
use tracing::debug;

/// A compiled TextMate grammar.
pub struct TextMateGrammar {
    name: String,
    scope_name: String,
    aliases: Vec<String>,
    rules: Vec<Rule>,
}

impl TextMateGrammar {
    /// Parse and compile a grammar from its JSON text.
    pub fn from_json(source: &str) -> Result<Self, TextMateError> {
        let raw: RawGrammar = serde_json::from_str(source).map_err(TextMateError::Json)?;
        Self::from_raw(&raw)
    }

    /// Compile an already parsed grammar.
    ///
    /// Rules whose regex does not compile are dropped with a warning.
    pub fn from_raw(raw: &RawGrammar) -> Result<Self, TextMateError> {
        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| raw.scope_name.rsplit('.').next().filter(|n| !n.is_empty()))
            .ok_or(TextMateError::MissingName)?
            .to_string();

        let rules = compile::compile(raw);
        debug!(grammar = %name, scope = %raw.scope_name, rules = rules.len(), "compiled TextMate grammar");

        Ok(Self {
            name,
            scope_name: raw.scope_name.clone(),
            aliases: raw.aliases.clone(),
            rules,
        })
    }

    /// The grammar's `name`, or the last component of its scope name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    /// Extra names the grammar answers to.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl fmt::Debug for TextMateGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMateGrammar")
            .field("name", &self.name)
            .field("scope_name", &self.scope_name)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Grammar for TextMateGrammar {
    fn parse(&self, text: &str) -> ParseResult {
        ParseResult {
            spans: tokenizer::tokenize(&self.rules, text),
        }
    }
}

/// Error when loading a TextMate grammar.
#[derive(Debug)]
pub enum TextMateError {
    /// The grammar is not valid JSON, or not shaped like a grammar.
    Json(serde_json::Error),
    /// Neither `name` nor `scopeName` gives the grammar a usable name.
    MissingName,
}

impl fmt::Display for TextMateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMateError::Json(e) => write!(f, "invalid TextMate grammar: {e}"),
            TextMateError::MissingName => write!(f, "TextMate grammar has no name or scopeName"),
        }
    }
}

impl std::error::Error for TextMateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextMateError::Json(e) => Some(e),
            TextMateError::MissingName => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HtmlFormat, Span, spans_to_html};
    use indoc::indoc;

    const LISP: &str = r##"{
        "name": "Lisp",
        "scopeName": "source.lisp",
        "aliases": ["lsp"],
        "patterns": [
            { "include": "#comment" },
            { "include": "#string" },
            { "include": "#long-string" },
            { "include": "#list" },
            { "match": "\\b\\d+\\b", "name": "constant.numeric.lisp" },
            { "match": "\\b(def|fn|if)\\b", "name": "keyword.control.lisp" },
            {
                "match": "(:)([a-z]+)",
                "captures": {
                    "1": { "name": "punctuation.definition.keyword.lisp" },
                    "2": { "name": "constant.other.$2.lisp" }
                }
            }
        ],
        "repository": {
            "comment": { "match": "#.*$", "name": "comment.line.lisp" },
            "string": {
                "begin": "\"",
                "end": "\"",
                "name": "string.quoted.double.lisp",
                "patterns": [ { "match": "\\\\.", "name": "constant.character.escape.lisp" } ]
            },
            "long-string": {
                "begin": "(`+)",
                "end": "\\1",
                "name": "string.quoted.long.lisp",
                "contentName": "meta.embedded.lisp"
            },
            "list": {
                "begin": "\\(",
                "end": "\\)",
                "beginCaptures": { "0": { "name": "punctuation.section.begin.lisp" } },
                "endCaptures": { "0": { "name": "punctuation.section.end.lisp" } },
                "name": "meta.list.lisp",
                "patterns": [ { "include": "$self" } ]
            }
        }
    }"##;

    fn lisp() -> TextMateGrammar {
        TextMateGrammar::from_json(LISP).unwrap()
    }

    fn scoped<'a>(source: &'a str, spans: &[Span], scope: &str) -> Vec<&'a str> {
        let mut found: Vec<(u32, &str)> = spans
            .iter()
            .filter(|s| s.capture == scope)
            .map(|s| (s.start, &source[s.start as usize..s.end as usize]))
            .collect();
        found.sort();
        found.into_iter().map(|(_, text)| text).collect()
    }

    #[test]
    fn test_metadata() {
        let grammar = lisp();
        assert_eq!(grammar.name(), "Lisp");
        assert_eq!(grammar.scope_name(), "source.lisp");
        assert_eq!(grammar.aliases(), ["lsp"]);
    }

    #[test]
    fn test_name_from_scope() {
        let grammar = TextMateGrammar::from_json(r#"{ "scopeName": "source.janet" }"#).unwrap();
        assert_eq!(grammar.name(), "janet");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TextMateGrammar::from_json("{ not json"),
            Err(TextMateError::Json(_))
        ));
        assert!(matches!(
            TextMateGrammar::from_json(r#"{ "scopeName": "" }"#),
            Err(TextMateError::MissingName)
        ));
    }

    #[test]
    fn test_match_rules() {
        let source = "(def x 42) # answer";
        let spans = lisp().parse(source).spans;
        assert_eq!(scoped(source, &spans, "keyword.control.lisp"), ["def"]);
        assert_eq!(scoped(source, &spans, "constant.numeric.lisp"), ["42"]);
        assert_eq!(scoped(source, &spans, "comment.line.lisp"), ["# answer"]);
    }

    #[test]
    fn test_begin_end_with_captures() {
        let source = "(if (f) 1)";
        let spans = lisp().parse(source).spans;
        assert_eq!(
            scoped(source, &spans, "meta.list.lisp"),
            ["(if (f) 1)", "(f)"]
        );
        assert_eq!(
            scoped(source, &spans, "punctuation.section.begin.lisp"),
            ["(", "("]
        );
        assert_eq!(
            scoped(source, &spans, "punctuation.section.end.lisp"),
            [")", ")"]
        );
    }

    #[test]
    fn test_string_across_lines() {
        let source = "\"one\\\"\ntwo\" 3\n";
        let spans = lisp().parse(source).spans;
        assert_eq!(
            scoped(source, &spans, "string.quoted.double.lisp"),
            ["\"one\\\"\ntwo\""]
        );
        assert_eq!(scoped(source, &spans, "constant.character.escape.lisp"), ["\\\""]);
        // The number after the string is outside it.
        assert_eq!(scoped(source, &spans, "constant.numeric.lisp"), ["3"]);
    }

    #[test]
    fn test_back_referenced_end() {
        let source = "``a ` b`` 7";
        let spans = lisp().parse(source).spans;
        assert_eq!(scoped(source, &spans, "string.quoted.long.lisp"), ["``a ` b``"]);
        assert_eq!(scoped(source, &spans, "meta.embedded.lisp"), ["a ` b"]);
        assert_eq!(scoped(source, &spans, "constant.numeric.lisp"), ["7"]);
    }

    #[test]
    fn test_capture_name_substitution() {
        let source = ":key";
        let spans = lisp().parse(source).spans;
        assert_eq!(
            scoped(source, &spans, "punctuation.definition.keyword.lisp"),
            [":"]
        );
        assert_eq!(scoped(source, &spans, "constant.other.key.lisp"), ["key"]);
    }

    #[test]
    fn test_unclosed_rule_runs_to_end() {
        let source = "(def x\n  \"open";
        let spans = lisp().parse(source).spans;
        assert_eq!(scoped(source, &spans, "meta.list.lisp"), [source]);
        assert_eq!(scoped(source, &spans, "string.quoted.double.lisp"), ["\"open"]);
    }

    #[test]
    fn test_while_rule() {
        let grammar = TextMateGrammar::from_json(
            r##"{
                "scopeName": "text.quote",
                "patterns": [
                    {
                        "begin": "^> ",
                        "while": "^> ",
                        "name": "markup.quote",
                        "patterns": [ { "match": "\\*\\w+\\*", "name": "markup.bold" } ]
                    }
                ]
            }"##,
        )
        .unwrap();

        let source = indoc! {"
            > one *two*
            > three
            four
        "};
        let spans = grammar.parse(source).spans;
        assert_eq!(
            scoped(source, &spans, "markup.quote"),
            ["> one *two*\n> three\n"]
        );
        assert_eq!(scoped(source, &spans, "markup.bold"), ["*two*"]);
    }

    #[test]
    fn test_apply_end_pattern_last() {
        let grammar = |last: bool| {
            TextMateGrammar::from_json(&format!(
                r##"{{
                    "scopeName": "source.t",
                    "patterns": [ {{
                        "begin": "<",
                        "end": ">",
                        "applyEndPatternLast": {last},
                        "name": "meta.tag",
                        "patterns": [ {{ "match": ">>", "name": "keyword.operator" }} ]
                    }} ]
                }}"##
            ))
            .unwrap()
        };

        let source = "<a>> b>";
        let spans = grammar(false).parse(source).spans;
        assert_eq!(scoped(source, &spans, "meta.tag"), ["<a>"]);

        let spans = grammar(true).parse(source).spans;
        assert_eq!(scoped(source, &spans, "meta.tag"), ["<a>> b>"]);
        assert_eq!(scoped(source, &spans, "keyword.operator"), [">>"]);
    }

    #[test]
    fn test_empty_matches_do_not_hang() {
        let grammar = TextMateGrammar::from_json(
            r##"{
                "scopeName": "source.t",
                "patterns": [
                    { "match": "\\b", "name": "keyword" },
                    { "begin": "(?=x)", "end": "(?=x)", "name": "string" },
                    { "match": "y+", "name": "constant.numeric" }
                ]
            }"##,
        )
        .unwrap();
        let source = "x yy x\n";
        let spans = grammar.parse(source).spans;
        assert_eq!(scoped(source, &spans, "keyword"), Vec::<&str>::new());
        assert_eq!(scoped(source, &spans, "constant.numeric"), ["yy"]);
    }

    #[test]
    fn test_render_through_theme_slots() {
        let source = "(def n 1) # c\n";
        let spans = lisp().parse(source).spans;
        let html = spans_to_html(
            source,
            spans,
            &HtmlFormat::CustomElements,
            gloss_theme::builtin::solarized_light(),
        );
        assert_eq!(
            html,
            "<a-p>(</a-p><a-k>def</a-k> n <a-n>1</a-n><a-p>)</a-p> <a-c># c</a-c>"
        );
    }

    #[test]
    fn test_grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TextMateGrammar>();
    }
}
