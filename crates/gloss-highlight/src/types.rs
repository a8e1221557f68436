//! Core types shared by every grammar implementation.

use std::fmt;

/// A highlighted byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where the span starts (inclusive).
    pub start: u32,
    /// Byte offset where the span ends (exclusive).
    pub end: u32,
    /// Capture name (`keyword.function`) or TextMate scope (`keyword.control.janet`).
    pub capture: String,
    /// Tie-breaker for spans covering the same range. Higher wins.
    ///
    /// Tree-sitter grammars use the query pattern index. TextMate grammars use
    /// the scope nesting depth, so the innermost scope wins.
    pub pattern_index: u32,
}

/// What a grammar produces for one piece of text.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub spans: Vec<Span>,
}

/// Error during highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// No grammar is registered for the language.
    UnsupportedLanguage(String),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnsupportedLanguage(lang) => write!(f, "unsupported language: {lang}"),
        }
    }
}

impl std::error::Error for HighlightError {}
