//! Built-in theme catalog.
//!
//! The visual theme catalog is an external collaborator from the pipeline's
//! point of view: a static mapping from theme name to a style table that the
//! core only ever looks up by id. This module provides the default set,
//! matching the names the editor UI historically offered. Callers are free
//! to build their own [`ThemeCatalog`] instead and inject that.

use syntect::highlighting::{Color, FontStyle, ScopeSelectors, StyleModifier, Theme, ThemeItem};

use crate::style::{StyleTable, ThemeCatalog};

/// Emphasis applied by a token rule on top of its color.
#[derive(Clone, Copy)]
enum Emphasis {
    None,
    Italic,
    Bold,
}

impl Emphasis {
    fn font_style(self) -> FontStyle {
        match self {
            Emphasis::None => FontStyle::empty(),
            Emphasis::Italic => FontStyle::ITALIC,
            Emphasis::Bold => FontStyle::BOLD,
        }
    }
}

/// Parses a `#rrggbb` literal into a syntect color.
///
/// Only used on the static data below; malformed literals fall back to
/// opaque black.
fn hex(value: &str) -> Color {
    let raw = value.trim_start_matches('#');
    let channel = |i: usize| {
        raw.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Color {
        r: channel(0),
        g: channel(2),
        b: channel(4),
        a: 255,
    }
}

/// Builds one style table from a background, foreground, and token rules.
fn table(background: &str, foreground: &str, rules: &[(&str, &str, Emphasis)]) -> StyleTable {
    let mut theme = Theme::default();
    theme.settings.background = Some(hex(background));
    theme.settings.foreground = Some(hex(foreground));

    for (selector, color, emphasis) in rules {
        let Ok(scope) = selector.parse::<ScopeSelectors>() else {
            continue;
        };
        theme.scopes.push(ThemeItem {
            scope,
            style: StyleModifier {
                foreground: Some(hex(color)),
                background: None,
                font_style: Some(emphasis.font_style()),
            },
        });
    }

    StyleTable::new(theme)
}

// Shared selector strings so every theme styles the same token classes.
const COMMENT: &str = "comment, punctuation.definition.comment";
const STRING: &str = "string";
const NUMBER: &str = "constant.numeric, constant.language";
const KEYWORD: &str = "keyword, storage, storage.modifier";
const FUNCTION: &str = "entity.name.function, support.function, variable.function";
const TYPE: &str = "entity.name.type, entity.name.class, support.type, support.class";

/// Builds the default theme catalog.
///
/// # Example
///
/// ```
/// let catalog = codeshot_renderer::themes::builtin();
/// assert!(catalog.contains("oneDark"));
/// assert!(catalog.names().count() >= 12);
/// ```
pub fn builtin() -> ThemeCatalog {
    use Emphasis::{Bold, Italic, None};

    let mut catalog = ThemeCatalog::new();

    catalog.insert(
        "oneDark",
        table(
            "#282c34",
            "#abb2bf",
            &[
                (COMMENT, "#5c6370", Italic),
                (STRING, "#98c379", None),
                (NUMBER, "#d19a66", None),
                (KEYWORD, "#c678dd", None),
                (FUNCTION, "#61afef", None),
                (TYPE, "#e5c07b", None),
            ],
        ),
    );

    catalog.insert(
        "oneLight",
        table(
            "#fafafa",
            "#383a42",
            &[
                (COMMENT, "#a0a1a7", Italic),
                (STRING, "#50a14f", None),
                (NUMBER, "#986801", None),
                (KEYWORD, "#a626a4", None),
                (FUNCTION, "#4078f2", None),
                (TYPE, "#c18401", None),
            ],
        ),
    );

    catalog.insert(
        "vscDarkPlus",
        table(
            "#1e1e1e",
            "#d4d4d4",
            &[
                (COMMENT, "#6a9955", None),
                (STRING, "#ce9178", None),
                (NUMBER, "#b5cea8", None),
                (KEYWORD, "#569cd6", None),
                (FUNCTION, "#dcdcaa", None),
                (TYPE, "#4ec9b0", None),
            ],
        ),
    );

    catalog.insert(
        "dracula",
        table(
            "#282a36",
            "#f8f8f2",
            &[
                (COMMENT, "#6272a4", None),
                (STRING, "#f1fa8c", None),
                (NUMBER, "#bd93f9", None),
                (KEYWORD, "#ff79c6", None),
                (FUNCTION, "#50fa7b", None),
                (TYPE, "#8be9fd", Italic),
            ],
        ),
    );

    catalog.insert(
        "nightOwl",
        table(
            "#011627",
            "#d6deeb",
            &[
                (COMMENT, "#637777", Italic),
                (STRING, "#ecc48d", None),
                (NUMBER, "#f78c6c", None),
                (KEYWORD, "#c792ea", Italic),
                (FUNCTION, "#82aaff", None),
                (TYPE, "#ffcb8b", None),
            ],
        ),
    );

    catalog.insert(
        "coldarkDark",
        table(
            "#111b27",
            "#e3eaf2",
            &[
                (COMMENT, "#8da1b9", None),
                (STRING, "#91d076", None),
                (NUMBER, "#e6d37a", None),
                (KEYWORD, "#e9ae7e", None),
                (FUNCTION, "#6cb8e6", None),
                (TYPE, "#c699e3", None),
            ],
        ),
    );

    catalog.insert(
        "coldarkCold",
        table(
            "#e3eaf2",
            "#111b27",
            &[
                (COMMENT, "#3c526d", None),
                (STRING, "#116b00", None),
                (NUMBER, "#755f00", None),
                (KEYWORD, "#a04900", None),
                (FUNCTION, "#005a8e", None),
                (TYPE, "#7c00aa", None),
            ],
        ),
    );

    catalog.insert(
        "materialLight",
        table(
            "#fafafa",
            "#90a4ae",
            &[
                (COMMENT, "#b0bec5", Italic),
                (STRING, "#91b859", None),
                (NUMBER, "#f76d47", None),
                (KEYWORD, "#39adb5", None),
                (FUNCTION, "#6182b8", None),
                (TYPE, "#e2931d", None),
            ],
        ),
    );

    catalog.insert(
        "materialDark",
        table(
            "#263238",
            "#eeffff",
            &[
                (COMMENT, "#546e7a", Italic),
                (STRING, "#c3e88d", None),
                (NUMBER, "#f78c6c", None),
                (KEYWORD, "#c792ea", None),
                (FUNCTION, "#82aaff", None),
                (TYPE, "#ffcb6b", None),
            ],
        ),
    );

    catalog.insert(
        "synthwave84",
        table(
            "#2b213a",
            "#f0eff1",
            &[
                (COMMENT, "#848bbd", Italic),
                (STRING, "#ff8b39", None),
                (NUMBER, "#f97e72", None),
                (KEYWORD, "#fede5d", None),
                (FUNCTION, "#36f9f6", Bold),
                (TYPE, "#fe4450", None),
            ],
        ),
    );

    catalog.insert(
        "solarizedlight",
        table(
            "#fdf6e3",
            "#657b83",
            &[
                (COMMENT, "#93a1a1", Italic),
                (STRING, "#2aa198", None),
                (NUMBER, "#d33682", None),
                (KEYWORD, "#859900", None),
                (FUNCTION, "#268bd2", None),
                (TYPE, "#b58900", None),
            ],
        ),
    );

    catalog.insert(
        "twilight",
        table(
            "#141414",
            "#f7f7f7",
            &[
                (COMMENT, "#5f5a60", Italic),
                (STRING, "#8f9d6a", None),
                (NUMBER, "#cf6a4c", None),
                (KEYWORD, "#cda869", None),
                (FUNCTION, "#9b703f", None),
                (TYPE, "#9b859d", None),
            ],
        ),
    );

    catalog
}
