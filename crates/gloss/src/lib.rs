//! gloss - a pandoc JSON filter that highlights code blocks.
//!
//! Pandoc hands a filter the document as JSON on stdin and reads the result
//! back from stdout. gloss replaces every top-level `CodeBlock` with a
//! `RawBlock` of format `html` holding highlighted markup. Every other block
//! passes through untouched.
//!
//! Two kinds of grammar are available:
//!
//! - a built-in tree-sitter shell grammar, under `bash`, `sh` and `shell`;
//! - one TextMate grammar loaded from JSON at startup, by default
//!   `assets/janet.tmLanguage.json`, under its name and aliases.
//!
//! Code blocks without a class, or with `text`, are escaped but not
//! highlighted. Any other language is an error, and the whole document fails.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gloss::{Document, FilterOptions, GrammarStore, Highlighter, filter_document};
//!
//! let store = Arc::new(GrammarStore::with_builtins().unwrap());
//! let hl = Highlighter::new(store, gloss_theme::builtin::solarized_dark().clone());
//!
//! let doc = Document::from_json(
//!     r#"{"pandoc-api-version":[1,23],"meta":{},"blocks":[
//!         {"t":"CodeBlock","c":[["",["sh"],[]],"echo hi"]}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let (doc, stats) = filter_document(doc, &hl, FilterOptions::default()).unwrap();
//! assert_eq!(stats.blocks_highlighted, 1);
//! assert!(doc.to_json().unwrap().contains(r#"{"t":"RawBlock","c":["html","<pre class="#));
//! ```

mod config;
mod document;
mod error;
mod filter;
mod highlighter;
mod loader;
mod store;

pub use config::{Config, parse_html_format};
pub use document::{Attr, Block, CodeBlock, Document, RawBlock};
pub use error::{Error, Result};
pub use filter::{CodeRenderer, FilterOptions, FilterStats, filter_document, transform_block};
pub use highlighter::Highlighter;
pub use loader::{DEFAULT_GRAMMAR_PATH, build_store, load_grammar};
pub use store::{BASH_NAMES, GrammarStore, PLAIN_TEXT_NAMES};

pub use gloss_highlight::HtmlFormat;
