//! Serde model of a TextMate grammar as found in `.tmLanguage.json` files.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};

/// A grammar file before compilation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGrammar {
    #[serde(default)]
    pub name: Option<String>,
    pub scope_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<RawRule>,
    #[serde(default)]
    pub repository: HashMap<String, RawRule>,
}

/// One entry of a `patterns` array or `repository`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default, rename = "match")]
    pub match_: Option<String>,
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, rename = "while")]
    pub while_: Option<String>,
    #[serde(default)]
    pub captures: Option<RawCaptures>,
    #[serde(default)]
    pub begin_captures: Option<RawCaptures>,
    #[serde(default)]
    pub end_captures: Option<RawCaptures>,
    #[serde(default)]
    pub while_captures: Option<RawCaptures>,
    #[serde(default)]
    pub patterns: Vec<RawRule>,
    #[serde(default)]
    pub repository: Option<HashMap<String, RawRule>>,
    #[serde(default, deserialize_with = "flag")]
    pub apply_end_pattern_last: bool,
    #[serde(default, deserialize_with = "flag")]
    pub disabled: bool,
}

/// Capture group number (as a string key, `"0"`, `"1"`, ...) to capture rule.
pub type RawCaptures = BTreeMap<String, RawCapture>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCapture {
    #[serde(default)]
    pub name: Option<String>,
    /// Sub-patterns applied to the captured text. Parsed but not run.
    #[serde(default)]
    pub patterns: Vec<RawRule>,
}

/// Grammars write boolean flags as `true` or as `1`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
