//! Loading the custom TextMate grammar from disk.

use std::fs;
use std::path::Path;

use gloss_highlight::TextMateGrammar;
use tracing::info;

use crate::error::{Error, Result};
use crate::store::GrammarStore;

/// Where the custom grammar lives, relative to the working directory.
pub const DEFAULT_GRAMMAR_PATH: &str = "assets/janet.tmLanguage.json";

/// Read and compile a TextMate grammar file.
pub fn load_grammar(path: &Path) -> Result<TextMateGrammar> {
    let source = fs::read_to_string(path).map_err(|source| Error::GrammarRead {
        path: path.to_path_buf(),
        source,
    })?;
    let grammar = TextMateGrammar::from_json(&source).map_err(|source| Error::GrammarParse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        name = grammar.name(),
        scope = grammar.scope_name(),
        "loaded grammar"
    );
    Ok(grammar)
}

/// Built-in grammars plus the custom grammar at `path`.
pub fn build_store(path: &Path) -> Result<GrammarStore> {
    let mut store = GrammarStore::with_builtins()?;
    let grammar = load_grammar(path)?;
    store.register_textmate(grammar);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_highlight::GrammarProvider;
    use std::io::Write;

    fn grammar_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file() {
        let err = load_grammar(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::GrammarRead { .. }), "got {err:?}");
    }

    #[test]
    fn test_invalid_json() {
        let file = grammar_file("{ not json");
        let err = load_grammar(file.path()).unwrap_err();
        assert!(matches!(err, Error::GrammarParse { .. }), "got {err:?}");
    }

    #[test]
    fn test_store_resolves_name_and_aliases() {
        let file = grammar_file(
            r#"{
                "name": "Toy",
                "scopeName": "source.toy",
                "aliases": ["toy-lang"],
                "patterns": [{ "match": "\\bdef\\b", "name": "keyword.control.toy" }]
            }"#,
        );
        let store = build_store(file.path()).unwrap();
        assert!(store.contains("toy"));
        assert!(store.contains("toy-lang"));
        assert!(store.contains("bash"));

        let spans = store.get("toy").unwrap().parse("def x").spans;
        assert!(spans.iter().any(|s| s.capture == "keyword.control.toy"));
    }

    #[test]
    fn test_bundled_janet_grammar() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(DEFAULT_GRAMMAR_PATH);
        let grammar = load_grammar(&path).unwrap();
        assert_eq!(grammar.name(), "janet");
        assert_eq!(grammar.scope_name(), "source.janet");
    }
}
