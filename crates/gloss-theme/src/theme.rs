//! Themes: per-slot styles plus base colors.
//!
//! A [`Theme`] assigns a [`Style`] to some of the [`ThemeSlot`]s. Slots with no
//! style render as plain text in the theme's foreground color.
//!
//! With the `toml` feature, themes can also be loaded from Helix-style TOML:
//!
//! ```toml
//! name = "Paper"
//! variant = "light"
//!
//! "ui.background" = { bg = "paper" }
//! "ui.text" = "ink"
//! "keyword" = { fg = "red", modifiers = ["bold"] }
//! "comment" = { fg = "#999999", modifiers = ["italic"] }
//! "string" = "green"
//!
//! [palette]
//! paper = "#fffff8"
//! ink = "#111111"
//! red = "#a00000"
//! green = "#007000"
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::highlights::ThemeSlot;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(Self::rgb),
            3 => {
                let mut channels = hex
                    .chars()
                    .map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                let r = channels.next()??;
                let g = channels.next()??;
                let b = channels.next()??;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Text decorations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        !(self.bold || self.italic || self.underline || self.strikethrough)
    }
}

/// The style of one theme slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub modifiers: Modifiers,
}

impl Style {
    /// A style with only a foreground color.
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            modifiers: Modifiers {
                bold: false,
                italic: false,
                underline: false,
                strikethrough: false,
            },
        }
    }

    pub const fn bold(mut self) -> Self {
        self.modifiers.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.modifiers.italic = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.modifiers.underline = true;
        self
    }

    pub const fn strikethrough(mut self) -> Self {
        self.modifiers.strikethrough = true;
        self
    }

    /// True if applying this style changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.modifiers.is_empty()
    }

    /// Render as inline CSS declarations, e.g. `color:#859900;font-style:italic`.
    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(fg) = self.fg {
            decls.push(format!("color:{fg}"));
        }
        if let Some(bg) = self.bg {
            decls.push(format!("background-color:{bg}"));
        }
        if self.modifiers.bold {
            decls.push("font-weight:bold".to_string());
        }
        if self.modifiers.italic {
            decls.push("font-style:italic".to_string());
        }
        match (self.modifiers.underline, self.modifiers.strikethrough) {
            (true, true) => decls.push("text-decoration:underline line-through".to_string()),
            (true, false) => decls.push("text-decoration:underline".to_string()),
            (false, true) => decls.push("text-decoration:line-through".to_string()),
            (false, false) => {}
        }
        decls.join(";")
    }
}

/// A named color theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Stable identifier, e.g. `solarized-light`. Used in CSS classes and lookups.
    pub id: String,
    /// Display name, e.g. `Solarized Light`.
    pub name: String,
    pub is_dark: bool,
    pub background: Option<Color>,
    pub foreground: Option<Color>,
    styles: HashMap<ThemeSlot, Style>,
}

impl Theme {
    /// Create an empty theme. The id is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            is_dark: false,
            background: None,
            foreground: None,
            styles: HashMap::new(),
        }
    }

    /// Get the style for a slot, if the theme defines one.
    pub fn style(&self, slot: ThemeSlot) -> Option<&Style> {
        self.styles.get(&slot)
    }

    /// Set (or replace) the style for a slot. Styles for [`ThemeSlot::None`] are ignored.
    pub fn set_style(&mut self, slot: ThemeSlot, style: Style) {
        if slot != ThemeSlot::None {
            self.styles.insert(slot, style);
        }
    }

    /// Inline CSS for the code block container: background and foreground.
    pub fn base_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(bg) = self.background {
            decls.push(format!("background-color:{bg}"));
        }
        if let Some(fg) = self.foreground {
            decls.push(format!("color:{fg}"));
        }
        decls.join(";")
    }

    /// Parse a Helix-style TOML theme.
    #[cfg(feature = "toml")]
    pub fn from_toml(source: &str) -> Result<Self, ThemeError> {
        let table: toml::Table = source
            .parse()
            .map_err(|e: toml::de::Error| ThemeError::Parse(e.to_string()))?;

        let name = table
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("custom");
        let mut theme = Theme::new(name);

        theme.is_dark = table.get("variant").and_then(|v| v.as_str()) == Some("dark");

        let palette: HashMap<String, Color> = match table.get("palette").and_then(|v| v.as_table())
        {
            Some(palette) => palette
                .iter()
                .map(|(key, value)| {
                    let raw = value.as_str().unwrap_or_default();
                    Color::parse(raw)
                        .map(|c| (key.clone(), c))
                        .ok_or_else(|| ThemeError::InvalidColor {
                            key: format!("palette.{key}"),
                            value: raw.to_string(),
                        })
                })
                .collect::<Result<_, _>>()?,
            None => HashMap::new(),
        };

        let resolve = |key: &str, raw: &str| -> Result<Color, ThemeError> {
            palette
                .get(raw)
                .copied()
                .or_else(|| Color::parse(raw))
                .ok_or_else(|| ThemeError::InvalidColor {
                    key: key.to_string(),
                    value: raw.to_string(),
                })
        };

        for (key, value) in &table {
            if matches!(key.as_str(), "name" | "variant" | "palette" | "inherits") {
                continue;
            }

            let style = parse_style(key, value, &resolve)?;

            match key.as_str() {
                "ui.background" => {
                    theme.background = style.bg.or(style.fg);
                    continue;
                }
                "ui.text" | "ui.foreground" => {
                    theme.foreground = style.fg;
                    continue;
                }
                other if other.starts_with("ui.") => continue,
                _ => {}
            }

            let slot = crate::highlights::capture_to_slot(key);
            if slot == ThemeSlot::None {
                continue;
            }
            // The slot's own name wins over any more specific scope that maps to it.
            if !theme.styles.contains_key(&slot) || slot.name() == Some(key.as_str()) {
                theme.set_style(slot, style);
            }
        }

        Ok(theme)
    }
}

#[cfg(feature = "toml")]
fn parse_style(
    key: &str,
    value: &toml::Value,
    resolve: &dyn Fn(&str, &str) -> Result<Color, ThemeError>,
) -> Result<Style, ThemeError> {
    match value {
        toml::Value::String(raw) => Ok(Style::fg(resolve(key, raw)?)),
        toml::Value::Table(table) => {
            let mut style = Style::default();
            if let Some(fg) = table.get("fg").and_then(|v| v.as_str()) {
                style.fg = Some(resolve(key, fg)?);
            }
            if let Some(bg) = table.get("bg").and_then(|v| v.as_str()) {
                style.bg = Some(resolve(key, bg)?);
            }
            if let Some(modifiers) = table.get("modifiers").and_then(|v| v.as_array()) {
                for modifier in modifiers.iter().filter_map(|m| m.as_str()) {
                    match modifier {
                        "bold" => style.modifiers.bold = true,
                        "italic" => style.modifiers.italic = true,
                        "underlined" | "underline" => style.modifiers.underline = true,
                        "crossed_out" | "strikethrough" => style.modifiers.strikethrough = true,
                        // dim, reversed, slow_blink... have no HTML equivalent
                        _ => {}
                    }
                }
            }
            Ok(style)
        }
        other => Err(ThemeError::InvalidStyle {
            key: key.to_string(),
            found: other.type_str().to_string(),
        }),
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Error when loading a theme.
#[derive(Debug)]
pub enum ThemeError {
    /// The theme source is not valid TOML.
    Parse(String),
    /// A color value is neither a palette entry nor a hex color.
    InvalidColor { key: String, value: String },
    /// A style is neither a color string nor a table.
    InvalidStyle { key: String, found: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::Parse(e) => write!(f, "invalid theme TOML: {e}"),
            ThemeError::InvalidColor { key, value } => {
                write!(f, "invalid color {value:?} for {key}")
            }
            ThemeError::InvalidStyle { key, found } => {
                write!(f, "style for {key} must be a string or table, found {found}")
            }
        }
    }
}

impl std::error::Error for ThemeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#fdf6e3"), Some(Color::rgb(0xfdf6e3)));
        assert_eq!(Color::parse("#FDF6E3"), Some(Color::rgb(0xfdf6e3)));
        assert_eq!(Color::parse("#fff"), Some(Color::new(255, 255, 255)));
        assert_eq!(Color::parse("fdf6e3"), None);
        assert_eq!(Color::parse("#fdf6e"), None);
        assert_eq!(Color::parse("#gggggg"), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(0x859900).to_string(), "#859900");
        assert_eq!(Color::new(0, 1, 2).to_string(), "#000102");
    }

    #[test]
    fn test_style_css() {
        let style = Style::fg(Color::rgb(0x93a1a1)).italic();
        assert_eq!(style.to_css(), "color:#93a1a1;font-style:italic");

        let style = Style::default().bold().underline().strikethrough();
        assert_eq!(
            style.to_css(),
            "font-weight:bold;text-decoration:underline line-through"
        );

        assert!(Style::default().is_empty());
        assert_eq!(Style::default().to_css(), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Solarized Light"), "solarized-light");
        assert_eq!(slugify("  GitHub (dark) "), "github-dark");
        assert_eq!(Theme::new("One Dark").id, "one-dark");
    }

    #[test]
    fn test_none_slot_is_never_styled() {
        let mut theme = Theme::new("t");
        theme.set_style(ThemeSlot::None, Style::fg(Color::rgb(0xff0000)));
        assert_eq!(theme.style(ThemeSlot::None), None);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml() {
        let theme = Theme::from_toml(
            r##"
name = "Paper Light"
variant = "light"

"ui.background" = { bg = "paper" }
"ui.text" = "ink"
"ui.cursor" = "red"
"keyword" = { fg = "red", modifiers = ["bold"] }
"keyword.control" = "#00ff00"
"comment" = { fg = "#999", modifiers = ["italic"] }
"string" = "green"
"entity.name.function" = "#0000aa"

[palette]
paper = "#fffff8"
ink = "#111111"
red = "#a00000"
green = "#007000"
"##,
        )
        .unwrap();

        assert_eq!(theme.id, "paper-light");
        assert!(!theme.is_dark);
        assert_eq!(theme.background, Some(Color::rgb(0xfffff8)));
        assert_eq!(theme.foreground, Some(Color::rgb(0x111111)));
        assert_eq!(
            theme.style(ThemeSlot::Keyword),
            Some(&Style::fg(Color::rgb(0xa00000)).bold())
        );
        assert_eq!(
            theme.style(ThemeSlot::Comment),
            Some(&Style::fg(Color::rgb(0x999999)).italic())
        );
        assert_eq!(
            theme.style(ThemeSlot::Function),
            Some(&Style::fg(Color::rgb(0x0000aa)))
        );
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_bad_color() {
        let err = Theme::from_toml(r#"keyword = "chartreuse""#).unwrap_err();
        assert!(matches!(err, ThemeError::InvalidColor { .. }), "{err}");

        let err = Theme::from_toml("keyword = 12").unwrap_err();
        assert!(matches!(err, ThemeError::InvalidStyle { .. }), "{err}");

        assert!(matches!(
            Theme::from_toml("not = = toml"),
            Err(ThemeError::Parse(_))
        ));
    }
}
