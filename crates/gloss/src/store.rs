//! Grammar registry shared by every highlighting call.

use std::collections::HashMap;
use std::fmt;

use gloss_highlight::{
    Grammar, GrammarProvider, PlainText, TextMateGrammar, TreeSitterGrammar,
    TreeSitterGrammarConfig,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Names that resolve to the unhighlighted plain-text grammar.
pub const PLAIN_TEXT_NAMES: [&str; 4] = ["text", "txt", "plain", "plaintext"];

/// Names of the built-in tree-sitter shell grammar.
pub const BASH_NAMES: [&str; 3] = ["bash", "sh", "shell"];

/// Compiled grammars, looked up by case-insensitive language name.
///
/// The store is immutable once built and is `Send + Sync`, so one instance
/// behind an `Arc` serves every thread.
pub struct GrammarStore {
    grammars: Vec<Box<dyn Grammar>>,
    names: HashMap<String, usize>,
}

impl Default for GrammarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GrammarStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarStore")
            .field("languages", &self.languages())
            .finish()
    }
}

impl GrammarStore {
    /// A store that only knows plain text.
    pub fn new() -> Self {
        let mut store = Self {
            grammars: Vec::new(),
            names: HashMap::new(),
        };
        store.register(PLAIN_TEXT_NAMES, PlainText);
        store
    }

    /// Plain text plus the built-in shell grammar.
    pub fn with_builtins() -> Result<Self> {
        let mut store = Self::new();
        store.register(BASH_NAMES, bash()?);
        Ok(store)
    }

    /// Register `grammar` under each of `names`. Names that are already taken
    /// keep their existing grammar. Returns how many names were registered.
    pub fn register<I, S, G>(&mut self, names: I, grammar: G) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        G: Grammar + 'static,
    {
        let index = self.grammars.len();
        let mut registered = 0;
        for name in names {
            let name = normalize(name.as_ref());
            if name.is_empty() {
                continue;
            }
            if self.names.contains_key(&name) {
                warn!(language = %name, "language name already registered, keeping existing grammar");
                continue;
            }
            self.names.insert(name, index);
            registered += 1;
        }
        if registered > 0 {
            self.grammars.push(Box::new(grammar));
        }
        registered
    }

    /// Register a TextMate grammar under its name and aliases.
    pub fn register_textmate(&mut self, grammar: TextMateGrammar) -> usize {
        let mut names = vec![grammar.name().to_string()];
        names.extend(grammar.aliases().iter().cloned());
        debug!(names = ?names, scope = grammar.scope_name(), "registering TextMate grammar");
        self.register(names, grammar)
    }

    /// Whether `language` resolves to a grammar.
    pub fn contains(&self, language: &str) -> bool {
        self.names.contains_key(&normalize(language))
    }

    /// All registered names, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl GrammarProvider for GrammarStore {
    fn get(&self, language: &str) -> Option<&dyn Grammar> {
        let index = *self.names.get(&normalize(language))?;
        Some(self.grammars[index].as_ref())
    }
}

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}

fn bash() -> Result<TreeSitterGrammar> {
    TreeSitterGrammar::new(TreeSitterGrammarConfig {
        language: tree_sitter_bash::LANGUAGE.into(),
        highlights_query: tree_sitter_bash::HIGHLIGHT_QUERY,
    })
    .map_err(|source| Error::BuiltinGrammar {
        language: "bash",
        source,
    })
}
