//! Style resolution: theme lookup and background paint resolution.
//!
//! The theme catalog is an injected, read-only lookup table; the core never
//! mutates a [`StyleTable`] and treats its contents as opaque beyond handing
//! them to the renderer.

use std::collections::BTreeMap;

use syntect::highlighting::{Color, Theme};

use crate::config::BackgroundSpec;
use crate::error::{Error, Result};

// ============================================================================
// StyleTable
// ============================================================================

/// A theme's mapping from syntax token class to paint attributes.
///
/// Wraps a syntect [`Theme`]; owned by the catalog, looked up by id, never
/// mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct StyleTable {
    pub(crate) theme: Theme,
}

impl StyleTable {
    /// Creates a style table from a syntect theme.
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// The theme's panel background color, if it defines one.
    pub fn background(&self) -> Option<Color> {
        self.theme.settings.background
    }

    /// The theme's default text color, if it defines one.
    pub fn foreground(&self) -> Option<Color> {
        self.theme.settings.foreground
    }
}

// ============================================================================
// ThemeCatalog
// ============================================================================

/// Read-only mapping from theme id to [`StyleTable`].
///
/// The catalog is supplied by the caller (see [`crate::themes::builtin`] for
/// the default set) and injected into the pipeline; it is enumerable so a
/// selector UI can be populated from it.
///
/// # Example
///
/// ```
/// use codeshot_renderer::themes;
///
/// let catalog = themes::builtin();
/// assert!(catalog.contains("oneDark"));
/// assert!(catalog.resolve("noSuchTheme").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    tables: BTreeMap<String, StyleTable>,
}

impl ThemeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a theme under the given id, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, table: StyleTable) {
        self.tables.insert(id.into(), table);
    }

    /// Returns true if the catalog contains the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// Iterates theme ids in stable (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the number of themes in the catalog.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the catalog holds no themes.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Looks up the style table for a theme id.
    ///
    /// Fails with [`Error::UnknownTheme`] when the id is absent.
    pub fn resolve(&self, id: &str) -> Result<&StyleTable> {
        self.tables
            .get(id)
            .ok_or_else(|| Error::UnknownTheme(id.to_string()))
    }
}

// ============================================================================
// PaintDescriptor
// ============================================================================

/// Resolved, renderer-ready background paint instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintDescriptor {
    /// Paint a solid `#rrggbb` color.
    Solid(String),
    /// Paint a gradient described by an opaque CSS-like expression.
    Gradient(String),
    /// Paint nothing; the captured background stays fully transparent.
    Transparent,
}

/// Resolves a background specification to a paint descriptor.
///
/// Solid colors pass through verbatim; gradient expressions are forwarded
/// opaquely without parsing or validation.
pub fn resolve_paint(spec: &BackgroundSpec) -> PaintDescriptor {
    match spec {
        BackgroundSpec::Solid(hex) => PaintDescriptor::Solid(hex.clone()),
        BackgroundSpec::Gradient(expr) => PaintDescriptor::Gradient(expr.clone()),
    }
}

// ============================================================================
// Tests
// ============================================================================
