//! Snapshot configuration and the mutable configuration store.
//!
//! A [`SnapshotConfig`] captures every user-adjustable parameter that
//! describes one code image. The [`SnapshotStore`] owns the single live
//! configuration for an editing session and applies mutations through
//! validating setters; each successful mutation bumps a version counter
//! that the pipeline uses to invalidate the current render target.

use serde::{Deserialize, Serialize};

use crate::style::ThemeCatalog;

/// Font size applied when input cannot be parsed as a positive integer.
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Lower clamp for configured font sizes.
pub const MIN_FONT_SIZE: u32 = 6;

/// Upper clamp for configured font sizes. Keeps the capture surface from
/// growing without bound on pathological input.
pub const MAX_FONT_SIZE: u32 = 96;

// ============================================================================
// Language
// ============================================================================

/// Source language used for syntax tokenization.
///
/// The set mirrors the language selector offered by the editor UI; tags
/// outside this set are rejected by [`SnapshotStore::set_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Python,
    Html,
    Java,
    Rust,
    Go,
    Cpp,
    Bash,
}

impl Language {
    /// All selectable languages, in selector order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Javascript,
            Language::Python,
            Language::Html,
            Language::Java,
            Language::Rust,
            Language::Go,
            Language::Cpp,
            Language::Bash,
        ]
    }

    /// Parses a loose language tag as offered by a selector UI.
    ///
    /// Accepts both display tags (`"javascript"`, `"c++"`) and short
    /// extension tokens (`"js"`, `"cpp"`). Returns `None` for tags outside
    /// the catalog.
    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Some(Language::Javascript),
            "python" | "py" => Some(Language::Python),
            "html" => Some(Language::Html),
            "java" => Some(Language::Java),
            "rust" | "rs" => Some(Language::Rust),
            "go" | "golang" => Some(Language::Go),
            "c++" | "cpp" => Some(Language::Cpp),
            "bash" | "sh" | "shell" => Some(Language::Bash),
            _ => None,
        }
    }

    /// Short token used to look up the matching syntax definition.
    pub fn token(&self) -> &'static str {
        match self {
            Language::Javascript => "js",
            Language::Python => "py",
            Language::Html => "html",
            Language::Java => "java",
            Language::Rust => "rs",
            Language::Go => "go",
            Language::Cpp => "cpp",
            Language::Bash => "sh",
        }
    }

    /// Human-readable label for selector UIs.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Javascript => "JavaScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Java => "Java",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Cpp => "C++",
            Language::Bash => "Bash",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Javascript
    }
}

// ============================================================================
// BackgroundSpec
// ============================================================================

/// Background requested for the area behind the code panel.
///
/// Gradients are carried as an opaque CSS-like expression; the store and
/// resolver forward them verbatim without validating the syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundSpec {
    /// A solid color given as a `#rrggbb` hex string.
    Solid(String),
    /// A CSS-like gradient expression, e.g.
    /// `linear-gradient(135deg, #667eea 0%, #764ba2 100%)`.
    Gradient(String),
}

impl BackgroundSpec {
    /// Creates a solid-color background.
    pub fn solid(hex: impl Into<String>) -> Self {
        Self::Solid(hex.into())
    }

    /// Creates a gradient background from a CSS-like expression.
    pub fn gradient(expr: impl Into<String>) -> Self {
        Self::Gradient(expr.into())
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::Solid("#ffffff".to_string())
    }
}

// ============================================================================
// SnapshotConfig
// ============================================================================

/// The full set of user-adjustable parameters describing one code image.
///
/// Always fully defined: every field has a default, so a config is never
/// partially initialized. Serializes to camelCase JSON for frontend
/// exchange:
///
/// ```json
/// {
///   "sourceText": "const x = 1;",
///   "language": "javascript",
///   "themeId": "oneDark",
///   "fontSizePx": 16,
///   "background": { "solid": "#ffffff" },
///   "backgroundVisible": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    /// The code to render. Empty text renders a placeholder line.
    pub source_text: String,

    /// Language used for tokenization.
    pub language: Language,

    /// Key into the theme catalog.
    pub theme_id: String,

    /// Font size in pixels, always within `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
    pub font_size_px: u32,

    /// Background behind the code panel.
    pub background: BackgroundSpec,

    /// Whether the background is painted. When false, capture still
    /// succeeds and yields a transparent background.
    pub background_visible: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            language: Language::default(),
            theme_id: "oneDark".to_string(),
            font_size_px: DEFAULT_FONT_SIZE,
            background: BackgroundSpec::default(),
            background_visible: true,
        }
    }
}

impl SnapshotConfig {
    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Coerces raw font-size input to a usable pixel value.
///
/// Non-numeric or non-positive input falls back to [`DEFAULT_FONT_SIZE`];
/// valid values are clamped to `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
pub fn coerce_font_size(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .map(|v| v.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
        .unwrap_or(DEFAULT_FONT_SIZE)
}

// ============================================================================
// SnapshotStore
// ============================================================================

/// Owns the single live [`SnapshotConfig`] for an editing session.
///
/// Setters validate their input class and bump a version counter only when
/// the configuration actually changed; the pipeline compares that counter
/// against the version its current render target was produced from, which
/// is what forces a recompute on the next read.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    config: SnapshotConfig,
    version: u64,
}

impl SnapshotStore {
    /// Creates a store holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from an existing configuration.
    pub fn with_config(config: SnapshotConfig) -> Self {
        Self { config, version: 0 }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Returns the current version counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Replaces the source text. Returns true if it changed.
    pub fn set_source_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.config.source_text == text {
            return false;
        }
        self.config.source_text = text;
        self.bump();
        true
    }

    /// Sets the language from a loose tag.
    ///
    /// Unknown tags are a no-op: the selector UI only ever offers valid
    /// keys, so this is a defensive contract for programmatic misuse.
    pub fn set_language(&mut self, tag: &str) -> bool {
        let Some(language) = Language::from_tag(tag) else {
            tracing::warn!(tag, "ignoring unknown language tag");
            return false;
        };
        if self.config.language == language {
            return false;
        }
        self.config.language = language;
        self.bump();
        true
    }

    /// Sets the theme id, validated against the given catalog.
    ///
    /// Ids absent from the catalog are a no-op.
    pub fn set_theme(&mut self, theme_id: &str, catalog: &ThemeCatalog) -> bool {
        if !catalog.contains(theme_id) {
            tracing::warn!(theme_id, "ignoring unknown theme id");
            return false;
        }
        if self.config.theme_id == theme_id {
            return false;
        }
        self.config.theme_id = theme_id.to_string();
        self.bump();
        true
    }

    /// Sets the font size from raw user input.
    ///
    /// Invalid input is coerced to the default rather than failing, see
    /// [`coerce_font_size`].
    pub fn set_font_size(&mut self, raw: &str) -> bool {
        let size = coerce_font_size(raw);
        if self.config.font_size_px == size {
            return false;
        }
        self.config.font_size_px = size;
        self.bump();
        true
    }

    /// Replaces the background specification. Returns true if it changed.
    pub fn set_background(&mut self, background: BackgroundSpec) -> bool {
        if self.config.background == background {
            return false;
        }
        self.config.background = background;
        self.bump();
        true
    }

    /// Flips background visibility. Always a change.
    pub fn toggle_background_visible(&mut self) -> bool {
        self.config.background_visible = !self.config.background_visible;
        self.bump();
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes;

    #[test]
    fn default_config_is_fully_defined() {
        let config = SnapshotConfig::default();
        assert_eq!(config.language, Language::Javascript);
        assert_eq!(config.theme_id, "oneDark");
        assert_eq!(config.font_size_px, DEFAULT_FONT_SIZE);
        assert_eq!(config.background, BackgroundSpec::Solid("#ffffff".into()));
        assert!(config.background_visible);
    }

    #[test]
    fn font_size_coercion_never_yields_zero() {
        assert_eq!(coerce_font_size(""), DEFAULT_FONT_SIZE);
        assert_eq!(coerce_font_size("abc"), DEFAULT_FONT_SIZE);
        assert_eq!(coerce_font_size("0"), DEFAULT_FONT_SIZE);
        assert_eq!(coerce_font_size("-4"), DEFAULT_FONT_SIZE);
        assert_eq!(coerce_font_size("24"), 24);
        assert_eq!(coerce_font_size(" 18 "), 18);
        // Clamped, not rejected
        assert_eq!(coerce_font_size("4"), MIN_FONT_SIZE);
        assert_eq!(coerce_font_size("500"), MAX_FONT_SIZE);
    }

    #[test]
    fn set_font_size_reverts_to_default_on_garbage() {
        let mut store = SnapshotStore::new();
        store.set_font_size("32");
        assert_eq!(store.config().font_size_px, 32);

        store.set_font_size("");
        assert_eq!(store.config().font_size_px, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn language_tags_parse_loosely() {
        assert_eq!(Language::from_tag("javascript"), Some(Language::Javascript));
        assert_eq!(Language::from_tag("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_tag("rs"), Some(Language::Rust));
        assert_eq!(Language::from_tag("brainfuck"), None);
    }

    #[test]
    fn unknown_language_is_a_noop() {
        let mut store = SnapshotStore::new();
        let before = store.version();
        assert!(!store.set_language("brainfuck"));
        assert_eq!(store.version(), before);
        assert_eq!(store.config().language, Language::Javascript);
    }

    #[test]
    fn unknown_theme_is_a_noop() {
        let catalog = themes::builtin();
        let mut store = SnapshotStore::new();
        assert!(!store.set_theme("noSuchTheme", &catalog));
        assert_eq!(store.config().theme_id, "oneDark");

        assert!(store.set_theme("dracula", &catalog));
        assert_eq!(store.config().theme_id, "dracula");
    }

    #[test]
    fn version_bumps_only_on_change() {
        let mut store = SnapshotStore::new();
        assert_eq!(store.version(), 0);

        assert!(store.set_source_text("let x = 1;"));
        assert_eq!(store.version(), 1);

        // Same value, no bump
        assert!(!store.set_source_text("let x = 1;"));
        assert_eq!(store.version(), 1);

        assert!(store.toggle_background_visible());
        assert!(store.toggle_background_visible());
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn config_json_roundtrip() {
        let mut config = SnapshotConfig::default();
        config.source_text = "print('hi')".to_string();
        config.language = Language::Python;
        config.background = BackgroundSpec::gradient("linear-gradient(135deg, #667eea, #764ba2)");

        let json = config.to_json().unwrap();
        assert!(json.contains("\"sourceText\""));
        assert!(json.contains("\"themeId\""));
        assert!(json.contains("\"gradient\""));

        let restored = SnapshotConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }
}
