//! Theme support for gloss syntax highlighting.
//!
//! This crate provides:
//! - Theme slot definitions (the small, fixed set of color categories)
//! - Mapping from tree-sitter capture names and TextMate scopes to slots
//! - Themes with per-slot styles, CSS output, and Helix-style TOML parsing
//! - Built-in themes (solarized, github)

pub mod builtin;
pub mod highlights;
pub mod theme;

pub use highlights::{ThemeSlot, capture_to_slot};
pub use theme::{Color, Modifiers, Style, Theme, ThemeError};
