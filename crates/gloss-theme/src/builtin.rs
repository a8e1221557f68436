//! Built-in themes.
//!
//! Each theme is built once on first use and lives for the rest of the process.

use std::sync::OnceLock;

use crate::highlights::ThemeSlot;
use crate::theme::{Color, Style, Theme};

/// The theme used when none is requested.
pub const DEFAULT: &str = "solarized-light";

struct Palette {
    background: u32,
    foreground: u32,
    comment: u32,
    keyword: u32,
    function: u32,
    string: u32,
    number: u32,
    constant: u32,
    r#type: u32,
    variable: u32,
    operator: u32,
    punctuation: u32,
    tag: u32,
    attribute: u32,
    added: u32,
    removed: u32,
    error: u32,
}

fn build(name: &str, is_dark: bool, p: &Palette) -> Theme {
    let mut theme = Theme::new(name);
    theme.is_dark = is_dark;
    theme.background = Some(Color::rgb(p.background));
    theme.foreground = Some(Color::rgb(p.foreground));

    let c = Color::rgb;
    let styles = [
        (ThemeSlot::Keyword, Style::fg(c(p.keyword))),
        (ThemeSlot::Function, Style::fg(c(p.function))),
        (ThemeSlot::String, Style::fg(c(p.string))),
        (ThemeSlot::Comment, Style::fg(c(p.comment)).italic()),
        (ThemeSlot::Type, Style::fg(c(p.r#type))),
        (ThemeSlot::Variable, Style::fg(c(p.variable))),
        (ThemeSlot::Constant, Style::fg(c(p.constant))),
        (ThemeSlot::Number, Style::fg(c(p.number))),
        (ThemeSlot::Operator, Style::fg(c(p.operator))),
        (ThemeSlot::Punctuation, Style::fg(c(p.punctuation))),
        (ThemeSlot::Property, Style::fg(c(p.variable))),
        (ThemeSlot::Attribute, Style::fg(c(p.attribute))),
        (ThemeSlot::Tag, Style::fg(c(p.tag))),
        (ThemeSlot::Macro, Style::fg(c(p.keyword)).bold()),
        (ThemeSlot::Label, Style::fg(c(p.constant))),
        (ThemeSlot::Namespace, Style::fg(c(p.r#type))),
        (ThemeSlot::Constructor, Style::fg(c(p.r#type))),
        (ThemeSlot::Title, Style::fg(c(p.function)).bold()),
        (ThemeSlot::Strong, Style::default().bold()),
        (ThemeSlot::Emphasis, Style::default().italic()),
        (ThemeSlot::Link, Style::fg(c(p.function)).underline()),
        (ThemeSlot::Literal, Style::fg(c(p.string))),
        (ThemeSlot::Strikethrough, Style::default().strikethrough()),
        (ThemeSlot::DiffAdd, Style::fg(c(p.added))),
        (ThemeSlot::DiffDelete, Style::fg(c(p.removed))),
        (ThemeSlot::Embedded, Style::fg(c(p.foreground))),
        (ThemeSlot::Error, Style::fg(c(p.error)).underline()),
    ];
    for (slot, style) in styles {
        theme.set_style(slot, style);
    }
    theme
}

/// Solarized Light (the default).
pub fn solarized_light() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        build(
            "Solarized Light",
            false,
            &Palette {
                background: 0xfdf6e3,
                foreground: 0x657b83,
                comment: 0x93a1a1,
                keyword: 0x859900,
                function: 0x268bd2,
                string: 0x2aa198,
                number: 0xd33682,
                constant: 0xcb4b16,
                r#type: 0xb58900,
                variable: 0x268bd2,
                operator: 0x859900,
                punctuation: 0x586e75,
                tag: 0x268bd2,
                attribute: 0x93a1a1,
                added: 0x859900,
                removed: 0xdc322f,
                error: 0xdc322f,
            },
        )
    })
}

pub fn solarized_dark() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        build(
            "Solarized Dark",
            true,
            &Palette {
                background: 0x002b36,
                foreground: 0x839496,
                comment: 0x586e75,
                keyword: 0x859900,
                function: 0x268bd2,
                string: 0x2aa198,
                number: 0xd33682,
                constant: 0xcb4b16,
                r#type: 0xb58900,
                variable: 0x268bd2,
                operator: 0x859900,
                punctuation: 0x93a1a1,
                tag: 0x268bd2,
                attribute: 0x586e75,
                added: 0x859900,
                removed: 0xdc322f,
                error: 0xdc322f,
            },
        )
    })
}

pub fn github_light() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        build(
            "GitHub Light",
            false,
            &Palette {
                background: 0xffffff,
                foreground: 0x24292f,
                comment: 0x6e7781,
                keyword: 0xcf222e,
                function: 0x8250df,
                string: 0x0a3069,
                number: 0x0550ae,
                constant: 0x0550ae,
                r#type: 0x953800,
                variable: 0x953800,
                operator: 0xcf222e,
                punctuation: 0x24292f,
                tag: 0x116329,
                attribute: 0x0550ae,
                added: 0x116329,
                removed: 0x82071e,
                error: 0x82071e,
            },
        )
    })
}

pub fn github_dark() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        build(
            "GitHub Dark",
            true,
            &Palette {
                background: 0x0d1117,
                foreground: 0xc9d1d9,
                comment: 0x8b949e,
                keyword: 0xff7b72,
                function: 0xd2a8ff,
                string: 0xa5d6ff,
                number: 0x79c0ff,
                constant: 0x79c0ff,
                r#type: 0xffa657,
                variable: 0xffa657,
                operator: 0xff7b72,
                punctuation: 0xc9d1d9,
                tag: 0x7ee787,
                attribute: 0x79c0ff,
                added: 0xaff5b4,
                removed: 0xffdcd7,
                error: 0xf85149,
            },
        )
    })
}

/// All built-in themes.
pub fn all() -> [&'static Theme; 4] {
    [solarized_light(), solarized_dark(), github_light(), github_dark()]
}

/// Look up a built-in theme by id. Case and `_`/`-` are ignored.
pub fn by_name(name: &str) -> Option<&'static Theme> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    all().into_iter().find(|theme| theme.id == wanted)
}
