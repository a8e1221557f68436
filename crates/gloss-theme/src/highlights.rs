//! Theme slot definitions - single source of truth.
//!
//! Grammars name the things they recognize with a large, open vocabulary:
//!
//! 1. **Capture names** from tree-sitter highlight queries
//!    (e.g., `keyword.function`, `include`, `conditional`)
//!
//! 2. **Scopes** from TextMate grammars, usually suffixed with the language
//!    (e.g., `keyword.control.janet`, `entity.name.function.janet`)
//!
//! Both are folded into a fixed set of theme slots, which is all a theme has to
//! define. Each slot also has a short tag for compact HTML output
//! (`<a-k>`, `<a-f>`, `<a-s>`) and a long name for class-based output.
//!
//! Adjacent spans that map to the same slot are coalesced into a single element.

/// The theme slots - the fixed set of color categories that themes define.
/// This is the final destination for all capture names and scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    Keyword,
    Function,
    String,
    Comment,
    Type,
    Variable,
    Constant,
    Number,
    Operator,
    Punctuation,
    Property,
    Attribute,
    Tag,
    Macro,
    Label,
    Namespace,
    Constructor,
    /// Markup: headings, titles
    Title,
    /// Markup: bold text
    Strong,
    /// Markup: italic text
    Emphasis,
    /// Markup: links/URLs
    Link,
    /// Markup: raw/literal/code blocks
    Literal,
    /// Markup: strikethrough
    Strikethrough,
    /// Diff additions
    DiffAdd,
    /// Diff deletions
    DiffDelete,
    /// Embedded content
    Embedded,
    /// Errors
    Error,
    /// No styling (`meta.*` scopes, `spell`, `nospell`, unknown names)
    None,
}

impl ThemeSlot {
    /// Every slot that can carry a style, in a stable order.
    pub const STYLED: [ThemeSlot; 27] = [
        ThemeSlot::Keyword,
        ThemeSlot::Function,
        ThemeSlot::String,
        ThemeSlot::Comment,
        ThemeSlot::Type,
        ThemeSlot::Variable,
        ThemeSlot::Constant,
        ThemeSlot::Number,
        ThemeSlot::Operator,
        ThemeSlot::Punctuation,
        ThemeSlot::Property,
        ThemeSlot::Attribute,
        ThemeSlot::Tag,
        ThemeSlot::Macro,
        ThemeSlot::Label,
        ThemeSlot::Namespace,
        ThemeSlot::Constructor,
        ThemeSlot::Title,
        ThemeSlot::Strong,
        ThemeSlot::Emphasis,
        ThemeSlot::Link,
        ThemeSlot::Literal,
        ThemeSlot::Strikethrough,
        ThemeSlot::DiffAdd,
        ThemeSlot::DiffDelete,
        ThemeSlot::Embedded,
        ThemeSlot::Error,
    ];

    /// Get the HTML tag suffix for this slot.
    /// Returns None for slots that produce no styling.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ThemeSlot::Keyword => Some("k"),
            ThemeSlot::Function => Some("f"),
            ThemeSlot::String => Some("s"),
            ThemeSlot::Comment => Some("c"),
            ThemeSlot::Type => Some("t"),
            ThemeSlot::Variable => Some("v"),
            ThemeSlot::Constant => Some("co"),
            ThemeSlot::Number => Some("n"),
            ThemeSlot::Operator => Some("o"),
            ThemeSlot::Punctuation => Some("p"),
            ThemeSlot::Property => Some("pr"),
            ThemeSlot::Attribute => Some("at"),
            ThemeSlot::Tag => Some("tg"),
            ThemeSlot::Macro => Some("m"),
            ThemeSlot::Label => Some("l"),
            ThemeSlot::Namespace => Some("ns"),
            ThemeSlot::Constructor => Some("cr"),
            ThemeSlot::Title => Some("tt"),
            ThemeSlot::Strong => Some("st"),
            ThemeSlot::Emphasis => Some("em"),
            ThemeSlot::Link => Some("tu"),
            ThemeSlot::Literal => Some("tl"),
            ThemeSlot::Strikethrough => Some("tx"),
            ThemeSlot::DiffAdd => Some("da"),
            ThemeSlot::DiffDelete => Some("dd"),
            ThemeSlot::Embedded => Some("eb"),
            ThemeSlot::Error => Some("er"),
            ThemeSlot::None => None,
        }
    }

    /// Get the long, human-readable name for this slot.
    ///
    /// Used for class-based HTML output and as the canonical key in theme files.
    pub fn name(self) -> Option<&'static str> {
        match self {
            ThemeSlot::Keyword => Some("keyword"),
            ThemeSlot::Function => Some("function"),
            ThemeSlot::String => Some("string"),
            ThemeSlot::Comment => Some("comment"),
            ThemeSlot::Type => Some("type"),
            ThemeSlot::Variable => Some("variable"),
            ThemeSlot::Constant => Some("constant"),
            ThemeSlot::Number => Some("number"),
            ThemeSlot::Operator => Some("operator"),
            ThemeSlot::Punctuation => Some("punctuation"),
            ThemeSlot::Property => Some("property"),
            ThemeSlot::Attribute => Some("attribute"),
            ThemeSlot::Tag => Some("tag"),
            ThemeSlot::Macro => Some("macro"),
            ThemeSlot::Label => Some("label"),
            ThemeSlot::Namespace => Some("namespace"),
            ThemeSlot::Constructor => Some("constructor"),
            ThemeSlot::Title => Some("title"),
            ThemeSlot::Strong => Some("strong"),
            ThemeSlot::Emphasis => Some("emphasis"),
            ThemeSlot::Link => Some("link"),
            ThemeSlot::Literal => Some("literal"),
            ThemeSlot::Strikethrough => Some("strikethrough"),
            ThemeSlot::DiffAdd => Some("diff-addition"),
            ThemeSlot::DiffDelete => Some("diff-deletion"),
            ThemeSlot::Embedded => Some("embedded"),
            ThemeSlot::Error => Some("error"),
            ThemeSlot::None => None,
        }
    }
}

/// Map any capture name or TextMate scope to its theme slot.
///
/// This handles:
/// - Standard tree-sitter names (keyword, function, string, etc.)
/// - nvim-treesitter legacy names (include, conditional, repeat, etc.)
/// - TextMate scopes (`entity.name.function`, `storage.type`, `constant.numeric`, ...)
///   with or without a trailing language suffix
///
/// All are mapped to the fixed set of theme slots.
pub fn capture_to_slot(capture: &str) -> ThemeSlot {
    // Some queries include the leading @
    let capture = capture.strip_prefix('@').unwrap_or(capture);

    match capture {
        // nvim-treesitter legacy names that are really keywords
        "include" | "conditional" | "repeat" | "exception" | "storageclass" | "preproc"
        | "define" | "structure" => ThemeSlot::Keyword,

        "function.macro" | "preproc.macro" => ThemeSlot::Macro,
        "escape" => ThemeSlot::String,
        "float" => ThemeSlot::Number,
        "field" => ThemeSlot::Variable,
        "boolean" => ThemeSlot::Constant,

        // tree-sitter markup names
        "text.title" => ThemeSlot::Title,
        "text.strong" => ThemeSlot::Strong,
        "text.emphasis" => ThemeSlot::Emphasis,
        "text.uri" | "text.reference" => ThemeSlot::Link,
        "text.literal" => ThemeSlot::Literal,
        "text.strikethrough" => ThemeSlot::Strikethrough,

        // canonical slot names, as used in theme files
        "title" => ThemeSlot::Title,
        "strong" => ThemeSlot::Strong,
        "emphasis" => ThemeSlot::Emphasis,
        "link" => ThemeSlot::Link,
        "literal" => ThemeSlot::Literal,
        "strikethrough" => ThemeSlot::Strikethrough,

        "diff.addition" | "diff.plus" | "diff.delta" | "diff-addition" => ThemeSlot::DiffAdd,
        "diff.deletion" | "diff.minus" | "diff-deletion" => ThemeSlot::DiffDelete,

        "none" | "nospell" | "spell" | "text" | "markup" | "source" => ThemeSlot::None,

        other => scope_prefix_slot(other),
    }
}

/// Scope prefixes, most specific first. A prefix matches a whole dotted
/// component, so `string` matches `string.quoted.double.janet` but not `strings`.
const SCOPE_PREFIXES: &[(&str, ThemeSlot)] = &[
    ("meta", ThemeSlot::None),
    ("punctuation.definition.comment", ThemeSlot::Comment),
    ("punctuation.definition.string", ThemeSlot::String),
    ("keyword.operator", ThemeSlot::Operator),
    ("keyword", ThemeSlot::Keyword),
    ("storage", ThemeSlot::Keyword),
    ("entity.name.function", ThemeSlot::Function),
    ("entity.name.type", ThemeSlot::Type),
    ("entity.name.class", ThemeSlot::Type),
    ("entity.other.inherited-class", ThemeSlot::Type),
    ("entity.name.namespace", ThemeSlot::Namespace),
    ("entity.name.tag", ThemeSlot::Tag),
    ("entity.name.section", ThemeSlot::Title),
    ("entity.name.label", ThemeSlot::Label),
    ("entity.other.attribute-name", ThemeSlot::Attribute),
    ("entity.name", ThemeSlot::Variable),
    ("support.function", ThemeSlot::Function),
    ("support.macro", ThemeSlot::Macro),
    ("support.type", ThemeSlot::Type),
    ("support.class", ThemeSlot::Type),
    ("support.constant", ThemeSlot::Constant),
    ("support.variable", ThemeSlot::Variable),
    ("constant.numeric", ThemeSlot::Number),
    ("constant.character", ThemeSlot::String),
    ("constant", ThemeSlot::Constant),
    ("string", ThemeSlot::String),
    ("character", ThemeSlot::String),
    ("comment", ThemeSlot::Comment),
    ("function.macro", ThemeSlot::Macro),
    ("function", ThemeSlot::Function),
    ("method", ThemeSlot::Function),
    ("type", ThemeSlot::Type),
    ("variable", ThemeSlot::Variable),
    ("parameter", ThemeSlot::Variable),
    ("number", ThemeSlot::Number),
    ("operator", ThemeSlot::Operator),
    ("punctuation", ThemeSlot::Punctuation),
    ("property", ThemeSlot::Property),
    ("attribute", ThemeSlot::Attribute),
    ("tag", ThemeSlot::Tag),
    ("macro", ThemeSlot::Macro),
    ("label", ThemeSlot::Label),
    ("namespace", ThemeSlot::Namespace),
    ("module", ThemeSlot::Namespace),
    ("constructor", ThemeSlot::Constructor),
    ("markup.heading", ThemeSlot::Title),
    ("markup.bold", ThemeSlot::Strong),
    ("markup.italic", ThemeSlot::Emphasis),
    ("markup.underline.link", ThemeSlot::Link),
    ("markup.link", ThemeSlot::Link),
    ("markup.raw", ThemeSlot::Literal),
    ("markup.inline", ThemeSlot::Literal),
    ("markup.strikethrough", ThemeSlot::Strikethrough),
    ("markup.inserted", ThemeSlot::DiffAdd),
    ("markup.deleted", ThemeSlot::DiffDelete),
    ("markup.list", ThemeSlot::Punctuation),
    ("markup.quote", ThemeSlot::Punctuation),
    ("embedded", ThemeSlot::Embedded),
    ("invalid", ThemeSlot::Error),
    ("error", ThemeSlot::Error),
];

fn scope_prefix_slot(scope: &str) -> ThemeSlot {
    SCOPE_PREFIXES
        .iter()
        .find(|(prefix, _)| has_scope_prefix(scope, prefix))
        .map(|&(_, slot)| slot)
        .unwrap_or(ThemeSlot::None)
}

fn has_scope_prefix(scope: &str, prefix: &str) -> bool {
    scope
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_to_slot_keywords() {
        assert_eq!(capture_to_slot("keyword"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("keyword.function"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("@keyword.import"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("include"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("conditional"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("storageclass"), ThemeSlot::Keyword);
    }

    #[test]
    fn test_textmate_scopes() {
        assert_eq!(capture_to_slot("keyword.control.janet"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("keyword.operator.arithmetic.c"), ThemeSlot::Operator);
        assert_eq!(capture_to_slot("storage.type.function.js"), ThemeSlot::Keyword);
        assert_eq!(capture_to_slot("entity.name.function.janet"), ThemeSlot::Function);
        assert_eq!(capture_to_slot("support.function.core.janet"), ThemeSlot::Function);
        assert_eq!(capture_to_slot("constant.numeric.decimal.janet"), ThemeSlot::Number);
        assert_eq!(capture_to_slot("constant.language.nil.janet"), ThemeSlot::Constant);
        assert_eq!(capture_to_slot("constant.character.escape.janet"), ThemeSlot::String);
        assert_eq!(capture_to_slot("string.quoted.double.janet"), ThemeSlot::String);
        assert_eq!(capture_to_slot("comment.line.number-sign.janet"), ThemeSlot::Comment);
        assert_eq!(
            capture_to_slot("punctuation.definition.comment.janet"),
            ThemeSlot::Comment
        );
        assert_eq!(capture_to_slot("punctuation.section.parens"), ThemeSlot::Punctuation);
        assert_eq!(capture_to_slot("invalid.illegal"), ThemeSlot::Error);
    }

    #[test]
    fn test_prefix_matches_whole_components() {
        assert_eq!(capture_to_slot("strings"), ThemeSlot::None);
        assert_eq!(capture_to_slot("keywordish.thing"), ThemeSlot::None);
        assert_eq!(capture_to_slot("typeface"), ThemeSlot::None);
    }

    #[test]
    fn test_meta_scopes_are_unstyled() {
        assert_eq!(capture_to_slot("meta.function-call.janet"), ThemeSlot::None);
        assert_eq!(capture_to_slot("source.janet"), ThemeSlot::None);
        assert_eq!(capture_to_slot("meta"), ThemeSlot::None);
    }

    #[test]
    fn test_capture_to_slot_markup() {
        assert_eq!(capture_to_slot("markup.heading"), ThemeSlot::Title);
        assert_eq!(capture_to_slot("markup.heading.1"), ThemeSlot::Title);
        assert_eq!(capture_to_slot("text.title"), ThemeSlot::Title);
        assert_eq!(capture_to_slot("markup.bold"), ThemeSlot::Strong);
        assert_eq!(capture_to_slot("markup.italic"), ThemeSlot::Emphasis);
        assert_eq!(capture_to_slot("markup.inserted.diff"), ThemeSlot::DiffAdd);
    }

    #[test]
    fn test_capture_to_slot_none() {
        assert_eq!(capture_to_slot("none"), ThemeSlot::None);
        assert_eq!(capture_to_slot("spell"), ThemeSlot::None);
        assert_eq!(capture_to_slot("nospell"), ThemeSlot::None);
        assert_eq!(capture_to_slot("something.unheard.of"), ThemeSlot::None);
    }

    #[test]
    fn test_macro_beats_function() {
        assert_eq!(capture_to_slot("function.macro"), ThemeSlot::Macro);
        assert_eq!(capture_to_slot("function.builtin"), ThemeSlot::Function);
    }

    #[test]
    fn test_every_styled_slot_has_tag_and_name() {
        for slot in ThemeSlot::STYLED {
            assert!(slot.tag().is_some(), "{slot:?} has no tag");
            assert!(slot.name().is_some(), "{slot:?} has no name");
        }
        assert_eq!(ThemeSlot::None.tag(), None);
        assert_eq!(ThemeSlot::None.name(), None);
    }

    #[test]
    fn test_slot_names_round_trip() {
        for slot in ThemeSlot::STYLED {
            let name = slot.name().unwrap();
            assert_eq!(capture_to_slot(name), slot, "{name}");
        }
    }
}
