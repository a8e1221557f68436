//! Block transformer and tree driver.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::document::{Block, Document, RawBlock};
use crate::error::Result;

/// Turns source code into an HTML fragment.
///
/// [`crate::Highlighter`] is the real implementation; tests substitute their own.
pub trait CodeRenderer: Sync {
    fn render(&self, language: &str, code: &str) -> Result<String>;
}

/// Options for [`filter_document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Transform blocks on the rayon thread pool.
    pub parallel: bool,
}

/// Statistics from one filter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Number of top-level blocks.
    pub blocks_seen: usize,
    /// Number of code blocks turned into raw HTML.
    pub blocks_highlighted: usize,
    /// Number of blocks returned unchanged.
    pub blocks_passed_through: usize,
    /// Languages named by the highlighted code blocks.
    pub languages: BTreeSet<String>,
}

/// Replace a code block with a raw HTML block. Every other block is returned
/// unchanged.
///
/// The language is the block's first class, `text` if it has none. The
/// identifier, other classes and attributes are dropped.
pub fn transform_block<R: CodeRenderer + ?Sized>(block: Block, renderer: &R) -> Result<Block> {
    match block {
        Block::CodeBlock(code) => {
            let language = code.language();
            debug!(language, bytes = code.text.len(), "highlighting code block");
            let html = renderer.render(language, &code.text)?;
            Ok(Block::RawBlock(RawBlock::html(html)))
        }
        other => Ok(other),
    }
}

/// Transform every top-level block of `doc`, keeping order and count.
///
/// Stops at the first error; nothing of the document is returned then.
pub fn filter_document<R: CodeRenderer + ?Sized>(
    doc: Document,
    renderer: &R,
    options: FilterOptions,
) -> Result<(Document, FilterStats)> {
    let Document { rest, blocks } = doc;

    let mut stats = FilterStats {
        blocks_seen: blocks.len(),
        ..Default::default()
    };
    for block in &blocks {
        match block {
            Block::CodeBlock(code) => {
                stats.blocks_highlighted += 1;
                stats.languages.insert(code.language().to_string());
            }
            _ => stats.blocks_passed_through += 1,
        }
    }

    let blocks = if options.parallel {
        blocks
            .into_par_iter()
            .map(|block| transform_block(block, renderer))
            .collect::<Result<Vec<_>>>()?
    } else {
        blocks
            .into_iter()
            .map(|block| transform_block(block, renderer))
            .collect::<Result<Vec<_>>>()?
    };

    info!(
        blocks = stats.blocks_seen,
        highlighted = stats.blocks_highlighted,
        passed_through = stats.blocks_passed_through,
        languages = ?stats.languages,
        parallel = options.parallel,
        "filtered document"
    );

    Ok((Document { rest, blocks }, stats))
}
