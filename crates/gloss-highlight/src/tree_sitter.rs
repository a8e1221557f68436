//! Tree-sitter based Grammar implementation.
//!
//! This module provides `TreeSitterGrammar` which implements the `Grammar` trait
//! using tree-sitter for parsing and highlighting queries.
//!
//! The grammar keeps only the language and compiled queries. A fresh `Parser`
//! and `QueryCursor` are made for each parse, which keeps the grammar
//! shareable between threads.
//!
//! # Example
//!
//! ```rust
//! use gloss_highlight::Grammar;
//! use gloss_highlight::tree_sitter::{TreeSitterGrammar, TreeSitterGrammarConfig};
//!
//! let config = TreeSitterGrammarConfig {
//!     language: tree_sitter_bash::LANGUAGE.into(),
//!     highlights_query: tree_sitter_bash::HIGHLIGHT_QUERY,
//! };
//!
//! let grammar = TreeSitterGrammar::new(config).unwrap();
//! let result = grammar.parse("echo hi # there");
//! assert!(result.spans.iter().any(|s| s.capture == "comment"));
//! ```

use crate::Grammar;
use crate::types::{ParseResult, Span};
use streaming_iterator::StreamingIterator;
use tracing::warn;
use tree_sitter::{Language, Parser, Query, QueryCursor};

/// Configuration for creating a TreeSitterGrammar.
pub struct TreeSitterGrammarConfig {
    /// The tree-sitter Language
    pub language: Language,
    /// The highlights query
    pub highlights_query: &'static str,
}

/// Error when creating a TreeSitterGrammar
#[derive(Debug)]
pub enum TreeSitterGrammarError {
    /// The language ABI is not supported by the linked tree-sitter runtime
    LanguageError(String),
    /// Failed to compile a query
    QueryError(String),
}

impl std::fmt::Display for TreeSitterGrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeSitterGrammarError::LanguageError(e) => {
                write!(f, "Failed to set parser language: {e}")
            }
            TreeSitterGrammarError::QueryError(e) => write!(f, "Query compilation error: {e}"),
        }
    }
}

impl std::error::Error for TreeSitterGrammarError {}

/// A tree-sitter based grammar that implements the Grammar trait.
///
/// This parses text using tree-sitter and runs the highlights query to
/// produce spans.
pub struct TreeSitterGrammar {
    language: Language,
    highlights_query: Query,
}

impl TreeSitterGrammar {
    /// Create a new TreeSitterGrammar from configuration.
    pub fn new(config: TreeSitterGrammarConfig) -> Result<Self, TreeSitterGrammarError> {
        // Fail at construction rather than on first parse.
        Parser::new()
            .set_language(&config.language)
            .map_err(|e| TreeSitterGrammarError::LanguageError(e.to_string()))?;

        let highlights_query = Query::new(&config.language, config.highlights_query)
            .map_err(|e| TreeSitterGrammarError::QueryError(e.to_string()))?;

        Ok(Self {
            language: config.language,
            highlights_query,
        })
    }
}

impl Grammar for TreeSitterGrammar {
    fn parse(&self, text: &str) -> ParseResult {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&self.language) {
            warn!(error = %e, "tree-sitter language rejected");
            return ParseResult::default();
        }
        let Some(tree) = parser.parse(text, None) else {
            return ParseResult::default();
        };

        let root_node = tree.root_node();
        let source = text.as_bytes();

        let mut spans = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.highlights_query, root_node, source);
        let capture_names = self.highlights_query.capture_names();

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let capture_name = capture_names[capture.index as usize];

                // Internal (`_foo`) captures carry no style.
                if capture_name.starts_with('_') {
                    continue;
                }

                let node = capture.node;
                spans.push(Span {
                    start: node.start_byte() as u32,
                    end: node.end_byte() as u32,
                    capture: capture_name.to_string(),
                    pattern_index: m.pattern_index as u32,
                });
            }
        }

        ParseResult { spans }
    }
}
