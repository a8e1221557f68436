//! Syntax highlighting engine for gloss.
//!
//! Two kinds of grammar sit behind one trait:
//!
//! - **Tree-sitter grammars** (feature `tree-sitter`): compiled-in parsers with
//!   highlight queries. Used for the built-in shell grammar.
//! - **TextMate grammars** (feature `textmate`): JSON grammars loaded at runtime
//!   and run by a line-oriented regex tokenizer.
//!
//! # Architecture
//!
//! - [`Grammar`]: parse text and return spans.
//! - [`GrammarProvider`]: look a grammar up by language name.
//!
//! [`highlight_spans`] resolves the grammar and parses. [`highlight`] renders
//! the result to HTML.
//!
//! Grammars take `&self` and are `Send + Sync`, so one provider can be shared
//! between threads.
//!
//! # Quick Start
//!
//! ```rust
//! use gloss_highlight::{
//!     Grammar, GrammarProvider, HighlightConfig, HtmlFormat, ParseResult, Span, highlight,
//! };
//!
//! struct Fn;
//! impl Grammar for Fn {
//!     fn parse(&self, text: &str) -> ParseResult {
//!         let spans = text
//!             .match_indices("fn")
//!             .map(|(i, m)| Span {
//!                 start: i as u32,
//!                 end: (i + m.len()) as u32,
//!                 capture: "keyword".into(),
//!                 pattern_index: 0,
//!             })
//!             .collect();
//!         ParseResult { spans }
//!     }
//! }
//!
//! struct Provider(Fn);
//! impl GrammarProvider for Provider {
//!     fn get(&self, language: &str) -> Option<&dyn Grammar> {
//!         (language == "toy").then_some(&self.0 as &dyn Grammar)
//!     }
//! }
//!
//! let config = HighlightConfig {
//!     html_format: HtmlFormat::CustomElements,
//! };
//! let theme = gloss_theme::builtin::solarized_light();
//! let html = highlight(&Provider(Fn), &config, theme, "toy", "fn main").unwrap();
//! assert_eq!(html, "<a-k>fn</a-k> main");
//! ```
//!
//! # HTML Output Formats
//!
//! - **`InlineStyles`** (default): `<span style="color:#859900">`, colors taken
//!   from the theme. Needs no stylesheet.
//! - **`CustomElements`**: compact custom elements like `<a-k>`, `<a-f>`.
//! - **`CustomElementsWithPrefix(prefix)`**: e.g. `<code-k>`.
//! - **`ClassNames`**: `<span class="keyword">`.
//! - **`ClassNamesWithPrefix(prefix)`**: e.g. `<span class="gl-keyword">`.

mod render;
mod types;

#[cfg(feature = "textmate")]
pub mod textmate;
#[cfg(feature = "tree-sitter")]
pub mod tree_sitter;

pub use render::{html_escape, spans_to_html};
pub use types::{HighlightError, ParseResult, Span};

#[cfg(feature = "textmate")]
pub use textmate::{TextMateError, TextMateGrammar};
#[cfg(feature = "tree-sitter")]
pub use self::tree_sitter::{TreeSitterGrammar, TreeSitterGrammarConfig, TreeSitterGrammarError};

use gloss_theme::Theme;

/// A grammar that can parse text and produce highlight spans.
///
/// Implemented by tree-sitter grammars, TextMate grammars, [`PlainText`], and
/// test doubles.
pub trait Grammar: Send + Sync {
    /// Parse text and return highlight spans.
    fn parse(&self, text: &str) -> ParseResult;
}

/// Provides grammars for languages.
pub trait GrammarProvider {
    /// Get the grammar for a language, or `None` if the language is not supported.
    fn get(&self, language: &str) -> Option<&dyn Grammar>;
}

/// A grammar that highlights nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Grammar for PlainText {
    fn parse(&self, _text: &str) -> ParseResult {
        ParseResult::default()
    }
}

/// HTML output format for syntax highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HtmlFormat {
    /// Spans with inline `style` attributes resolved from the theme (default).
    ///
    /// ```html
    /// <span style="color:#859900">fn</span> <span style="color:#268bd2">main</span>()
    /// ```
    #[default]
    InlineStyles,

    /// Custom elements with default prefix: `<a-k>`, `<a-f>`, etc.
    ///
    /// ```html
    /// <a-k>fn</a-k> <a-f>main</a-f>()
    /// ```
    CustomElements,

    /// Custom elements with custom prefix: `<prefix-k>`, `<prefix-f>`, etc.
    CustomElementsWithPrefix(String),

    /// Traditional class-based spans: `<span class="keyword">`, etc.
    ///
    /// ```html
    /// <span class="keyword">fn</span> <span class="function">main</span>()
    /// ```
    ClassNames,

    /// Class-based spans with custom prefix: `<span class="prefix-keyword">`, etc.
    ClassNamesWithPrefix(String),
}

/// Configuration for highlighting.
#[derive(Debug, Clone, Default)]
pub struct HighlightConfig {
    /// HTML output format.
    pub html_format: HtmlFormat,
}

/// Highlight and return raw spans for the full text.
pub fn highlight_spans<P: GrammarProvider + ?Sized>(
    provider: &P,
    language: &str,
    source: &str,
) -> Result<Vec<Span>, HighlightError> {
    let grammar = provider
        .get(language)
        .ok_or_else(|| HighlightError::UnsupportedLanguage(language.into()))?;
    Ok(grammar.parse(source).spans)
}

/// Highlight `source` as `language` and render the spans as HTML.
///
/// Returns only the highlighted code, without any `<pre>` wrapper.
pub fn highlight<P: GrammarProvider + ?Sized>(
    provider: &P,
    config: &HighlightConfig,
    theme: &Theme,
    language: &str,
    source: &str,
) -> Result<String, HighlightError> {
    let spans = highlight_spans(provider, language, source)?;
    Ok(spans_to_html(source, spans, &config.html_format, theme))
}
