//! Error type for the filter library.

use std::path::PathBuf;

use gloss_highlight::{HighlightError, TextMateError, TreeSitterGrammarError};
use gloss_theme::ThemeError;
use thiserror::Error;

/// Errors that can occur while building the engine or filtering a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The grammar file could not be read.
    #[error("failed to read grammar {}", .path.display())]
    GrammarRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The grammar file is not a usable TextMate grammar.
    #[error("failed to parse grammar {}", .path.display())]
    GrammarParse {
        path: PathBuf,
        #[source]
        source: TextMateError,
    },

    /// A built-in tree-sitter grammar failed to compile its queries.
    #[error("built-in grammar `{language}` is broken")]
    BuiltinGrammar {
        language: &'static str,
        #[source]
        source: TreeSitterGrammarError,
    },

    /// No built-in theme has this name.
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    /// The theme file could not be parsed.
    #[error("failed to load theme file {}", .path.display())]
    ThemeFile {
        path: PathBuf,
        #[source]
        source: ThemeError,
    },

    /// The input is not a pandoc JSON document.
    #[error("invalid pandoc document")]
    Document(#[from] serde_json::Error),

    /// A known block tag with content of the wrong shape.
    #[error("malformed {tag} block: {message}")]
    MalformedBlock { tag: &'static str, message: String },

    /// A code block names a language no grammar is registered for.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<HighlightError> for Error {
    fn from(e: HighlightError) -> Self {
        match e {
            HighlightError::UnsupportedLanguage(language) => Error::UnsupportedLanguage { language },
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
