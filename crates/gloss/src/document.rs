//! The slice of the pandoc JSON AST this filter understands.
//!
//! Only top-level `CodeBlock` nodes are decoded on input. Every other block,
//! `RawBlock` included, is kept as the JSON value it was read as and written
//! back unchanged, so pandoc versions with new block types pass straight
//! through. [`RawBlock`] exists for output only.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

const CODE_BLOCK: &str = "CodeBlock";
const RAW_BLOCK: &str = "RawBlock";

/// A pandoc document: the block list plus every other top-level field
/// (`pandoc-api-version`, `meta`, ...) carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(flatten)]
    pub rest: Map<String, Value>,
    pub blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct RawDocument {
    blocks: Vec<Value>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl Document {
    /// Parse a document from pandoc's JSON output.
    ///
    /// Fails with [`Error::Document`] when the input is not JSON or has no
    /// `blocks` array, and with [`Error::MalformedBlock`] when a code block
    /// has content of the wrong shape.
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(input)?;
        let blocks = raw
            .blocks
            .into_iter()
            .map(Block::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rest: raw.rest,
            blocks,
        })
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A top-level block node, `{ "t": tag, "c": content }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Value")]
pub enum Block {
    CodeBlock(CodeBlock),
    RawBlock(RawBlock),
    /// Any other node. Never inspected.
    Other(Value),
}

/// Pandoc's `Attr`: identifier, classes, key-value attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, Vec<String>, Vec<(String, String)>)",
    into = "(String, Vec<String>, Vec<(String, String)>)"
)]
pub struct Attr {
    pub id: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl From<(String, Vec<String>, Vec<(String, String)>)> for Attr {
    fn from((id, classes, attributes): (String, Vec<String>, Vec<(String, String)>)) -> Self {
        Self {
            id,
            classes,
            attributes,
        }
    }
}

impl From<Attr> for (String, Vec<String>, Vec<(String, String)>) {
    fn from(attr: Attr) -> Self {
        (attr.id, attr.classes, attr.attributes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub attr: Attr,
    pub text: String,
}

impl CodeBlock {
    /// Language used when a code block has no classes.
    pub const DEFAULT_LANGUAGE: &'static str = "text";

    pub fn new(classes: &[&str], text: impl Into<String>) -> Self {
        Self {
            attr: Attr {
                classes: classes.iter().map(|c| c.to_string()).collect(),
                ..Attr::default()
            },
            text: text.into(),
        }
    }

    /// The first class, which pandoc sets from the fence info string.
    pub fn language(&self) -> &str {
        self.attr
            .classes
            .first()
            .map(String::as_str)
            .unwrap_or(Self::DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    pub format: String,
    pub text: String,
}

impl RawBlock {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: "html".into(),
            text: text.into(),
        }
    }
}

impl TryFrom<Value> for Block {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value.get("t").and_then(Value::as_str) {
            Some(CODE_BLOCK) => {
                let (attr, text) = content(value, CODE_BLOCK)?;
                Ok(Block::CodeBlock(CodeBlock { attr, text }))
            }
            _ => Ok(Block::Other(value)),
        }
    }
}

fn content<T: DeserializeOwned>(mut value: Value, tag: &'static str) -> Result<T> {
    let c = value
        .get_mut("c")
        .map(Value::take)
        .ok_or_else(|| Error::MalformedBlock {
            tag,
            message: "missing content".into(),
        })?;
    serde_json::from_value(c).map_err(|e| Error::MalformedBlock {
        tag,
        message: e.to_string(),
    })
}

impl From<Block> for Value {
    fn from(block: Block) -> Self {
        match block {
            Block::CodeBlock(CodeBlock { attr, text }) => {
                json!({ "t": CODE_BLOCK, "c": [attr, text] })
            }
            Block::RawBlock(RawBlock { format, text }) => {
                json!({ "t": RAW_BLOCK, "c": [format, text] })
            }
            Block::Other(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn block(value: Value) -> Result<Block> {
        Block::try_from(value)
    }

    #[test]
    fn test_code_block_fields() {
        let parsed = block(json!({
            "t": "CodeBlock",
            "c": [["snippet", ["janet", "numberLines"], [["startFrom", "3"]]], "(print 1)"]
        }))
        .unwrap();

        let Block::CodeBlock(code) = parsed else {
            panic!("expected a code block, got {parsed:?}");
        };
        assert_eq!(code.attr.id, "snippet");
        assert_eq!(code.language(), "janet");
        assert_eq!(
            code.attr.attributes,
            vec![("startFrom".to_string(), "3".to_string())]
        );
        assert_eq!(code.text, "(print 1)");
    }

    #[test]
    fn test_code_block_without_classes_is_text() {
        let code = CodeBlock::new(&[], "plain");
        assert_eq!(code.language(), "text");
    }

    #[test]
    fn test_other_blocks_are_opaque() {
        let para = json!({ "t": "Para", "c": [{ "t": "Str", "c": "Hi" }] });
        assert_eq!(block(para.clone()).unwrap(), Block::Other(para.clone()));
        assert_eq!(Value::from(Block::Other(para.clone())), para);

        let untagged = json!({ "weird": true });
        assert_eq!(block(untagged.clone()).unwrap(), Block::Other(untagged));

        let not_an_object = json!(42);
        assert_eq!(block(not_an_object.clone()).unwrap(), Block::Other(not_an_object));
    }

    #[test]
    fn test_raw_block_serializes_to_pandoc_shape() {
        let value = Value::from(Block::RawBlock(RawBlock::html("<b>x</b>")));
        assert_eq!(value, json!({ "t": "RawBlock", "c": ["html", "<b>x</b>"] }));
    }

    #[test]
    fn test_malformed_code_block() {
        let err = block(json!({ "t": "CodeBlock", "c": ["only one"] })).unwrap_err();
        assert!(
            matches!(err, Error::MalformedBlock { tag: "CodeBlock", .. }),
            "got {err:?}"
        );

        let err = block(json!({ "t": "CodeBlock" })).unwrap_err();
        assert!(matches!(err, Error::MalformedBlock { tag: "CodeBlock", .. }));
    }

    #[test]
    fn test_incoming_raw_blocks_are_opaque() {
        for raw in [
            json!({ "t": "RawBlock", "c": [] }),
            json!({ "t": "RawBlock", "c": ["html"] }),
            json!({ "t": "RawBlock", "c": ["html", 7] }),
            json!({ "t": "RawBlock", "c": ["html", "<hr>"], "extra": 1 }),
        ] {
            assert_eq!(block(raw.clone()).unwrap(), Block::Other(raw.clone()));
            assert_eq!(Value::from(Block::Other(raw.clone())), raw);
        }
    }

    #[test]
    fn test_floats_survive_round_trip() {
        let input = r#"{"blocks":[{"t":"Para","c":[1.0715660391465826e-75,-1.81996730402717e-179,0.3333333333333333]}]}"#;
        let doc = Document::from_json(input).unwrap();
        let out = doc.to_json().unwrap();

        let round: Value = serde_json::from_str(&out).unwrap();
        let numbers = round["blocks"][0]["c"].as_array().unwrap();
        for (number, text) in numbers.iter().zip([
            "1.0715660391465826e-75",
            "-1.81996730402717e-179",
            "0.3333333333333333",
        ]) {
            let expected: f64 = text.parse().unwrap();
            assert_eq!(number.as_f64().unwrap().to_bits(), expected.to_bits(), "{out}");
        }
    }

    #[test]
    fn test_document_keeps_other_fields() {
        let input = indoc! {r#"
            {
              "pandoc-api-version": [1, 23, 1],
              "meta": { "title": { "t": "MetaInlines", "c": [] } },
              "blocks": [
                { "t": "CodeBlock", "c": [["", ["sh"], []], "ls"] },
                { "t": "HorizontalRule" }
              ]
            }
        "#};
        let doc = Document::from_json(input).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.rest["pandoc-api-version"], json!([1, 23, 1]));

        let round: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let original: Value = serde_json::from_str(input).unwrap();
        assert_eq!(round, original);
    }

    #[test]
    fn test_document_requires_blocks() {
        let err = Document::from_json(r#"{ "meta": {} }"#).unwrap_err();
        assert!(matches!(err, Error::Document(_)));

        let err = Document::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }
}
