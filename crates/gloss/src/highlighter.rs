//! The highlighting engine handle used by the filter.
//!
//! A [`Highlighter`] bundles the compiled grammars, the theme and the render
//! options. It is built once per process and only read afterwards, so one
//! instance can be shared by reference across threads.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gloss::{GrammarStore, Highlighter};
//!
//! let store = Arc::new(GrammarStore::with_builtins().unwrap());
//! let theme = gloss_theme::builtin::solarized_light().clone();
//! let hl = Highlighter::new(store, theme);
//!
//! let html = hl.render_block("text", "a < b").unwrap();
//! assert_eq!(
//!     html,
//!     "<pre class=\"gloss solarized-light\" style=\"background-color:#fdf6e3;color:#657b83\">\
//!      <code class=\"language-text\">a &lt; b</code></pre>"
//! );
//! ```

use std::sync::Arc;

use gloss_highlight::{HighlightConfig, Span, html_escape, spans_to_html};
use gloss_theme::Theme;

use crate::Config;
use crate::error::Result;
use crate::filter::CodeRenderer;
use crate::loader;
use crate::store::GrammarStore;

/// Syntax highlighter producing complete `<pre>` blocks.
#[derive(Debug, Clone)]
pub struct Highlighter {
    store: Arc<GrammarStore>,
    theme: Theme,
    config: HighlightConfig,
}

impl Highlighter {
    /// Create a highlighter with default render options.
    pub fn new(store: Arc<GrammarStore>, theme: Theme) -> Self {
        Self::with_config(store, theme, HighlightConfig::default())
    }

    pub fn with_config(store: Arc<GrammarStore>, theme: Theme, config: HighlightConfig) -> Self {
        Self {
            store,
            theme,
            config,
        }
    }

    /// Build the whole engine from configuration: built-in grammars, the
    /// custom grammar file and the theme. Fails on any configuration error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let theme = config.load_theme()?;
        let store = loader::build_store(&config.grammar_path)?;
        let highlight = HighlightConfig {
            html_format: config.html_format.clone(),
        };
        Ok(Self::with_config(Arc::new(store), theme, highlight))
    }

    /// Get the grammar store.
    ///
    /// Use this to create additional highlighters that share compiled grammars.
    pub fn store(&self) -> &Arc<GrammarStore> {
        &self.store
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Highlight and return raw spans (for custom rendering).
    pub fn highlight_spans(&self, language: &str, source: &str) -> Result<Vec<Span>> {
        Ok(gloss_highlight::highlight_spans(
            self.store.as_ref(),
            language,
            source,
        )?)
    }

    /// Highlight source code and return the inner HTML, without a wrapper.
    pub fn highlight(&self, language: &str, source: &str) -> Result<String> {
        let spans = self.highlight_spans(language, source)?;
        Ok(spans_to_html(
            source,
            spans,
            &self.config.html_format,
            &self.theme,
        ))
    }

    /// Highlight source code and wrap it in a themed `<pre><code>` block.
    pub fn render_block(&self, language: &str, source: &str) -> Result<String> {
        let body = self.highlight(language, source)?;
        let mut html = String::with_capacity(body.len() + 128);
        html.push_str("<pre class=\"gloss ");
        html.push_str(&html_escape(&self.theme.id));
        html.push('"');
        let base = self.theme.base_css();
        if !base.is_empty() {
            html.push_str(" style=\"");
            html.push_str(&html_escape(&base));
            html.push('"');
        }
        html.push_str("><code class=\"language-");
        html.push_str(&html_escape(language));
        html.push_str("\">");
        html.push_str(&body);
        html.push_str("</code></pre>");
        Ok(html)
    }
}

impl CodeRenderer for Highlighter {
    fn render(&self, language: &str, code: &str) -> Result<String> {
        self.render_block(language, code)
    }
}
