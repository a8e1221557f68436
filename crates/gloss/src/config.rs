use std::fs;
use std::path::{Path, PathBuf};

use gloss_highlight::HtmlFormat;
use gloss_theme::{Theme, builtin};

use crate::error::{Error, Result};
use crate::loader::DEFAULT_GRAMMAR_PATH;

/// Filter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the custom TextMate grammar.
    pub grammar_path: PathBuf,

    /// Built-in theme id. Ignored when `theme_file` is set.
    pub theme: String,

    /// Helix-style TOML theme to use instead of a built-in one.
    pub theme_file: Option<PathBuf>,

    /// HTML output format for the highlighted code.
    pub html_format: HtmlFormat,

    /// Transform blocks on the rayon thread pool.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grammar_path: PathBuf::from(DEFAULT_GRAMMAR_PATH),
            theme: builtin::DEFAULT.to_string(),
            theme_file: None,
            html_format: HtmlFormat::default(),
            parallel: false,
        }
    }
}

impl Config {
    /// Resolve the configured theme.
    pub fn load_theme(&self) -> Result<Theme> {
        match &self.theme_file {
            Some(path) => load_theme_file(path),
            None => builtin::by_name(&self.theme)
                .cloned()
                .ok_or_else(|| Error::UnknownTheme(self.theme.clone())),
        }
    }
}

/// Parse a `--format` value: `inline`, `elements` or `classes`, optionally
/// followed by `:PREFIX` for the latter two.
pub fn parse_html_format(value: &str) -> Option<HtmlFormat> {
    let (kind, prefix) = match value.split_once(':') {
        Some((kind, prefix)) => (kind, Some(prefix.to_string())),
        None => (value, None),
    };
    match (kind.trim().to_ascii_lowercase().as_str(), prefix) {
        ("inline", None) => Some(HtmlFormat::InlineStyles),
        ("elements", None) => Some(HtmlFormat::CustomElements),
        ("elements", Some(prefix)) => Some(HtmlFormat::CustomElementsWithPrefix(prefix)),
        ("classes", None) => Some(HtmlFormat::ClassNames),
        ("classes", Some(prefix)) => Some(HtmlFormat::ClassNamesWithPrefix(prefix)),
        _ => None,
    }
}

fn load_theme_file(path: &Path) -> Result<Theme> {
    let source = fs::read_to_string(path)?;
    Theme::from_toml(&source).map_err(|source| Error::ThemeFile {
        path: path.to_path_buf(),
        source,
    })
}
