//! Preview renderer: composes configuration + style + paint into a
//! capturable visual tree.
//!
//! The visual tree is an SVG document: an optional outer background paint,
//! a rounded panel filled with the theme's background, and one line of
//! absolutely positioned, token-colored monospace text per source line.
//! Rendering is deterministic — identical inputs produce byte-identical
//! documents — and every render produces a fresh target with its own
//! handle; targets are superseded, never mutated.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::SnapshotConfig;
use crate::style::{PaintDescriptor, StyleTable};

/// Placeholder rendered when the source text is empty, so capture never
/// produces a zero-content image.
pub const PLACEHOLDER_TEXT: &str = "// Your code will appear here...";

// Layout constants matching the original preview surface.
const OUTER_PAD: f32 = 16.0;
const INNER_PAD: f32 = 16.0;
const CORNER_RADIUS: f32 = 8.0;
const CHAR_ADVANCE_EM: f32 = 0.6;
const LINE_HEIGHT_EM: f32 = 1.5;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// TargetHandle
// ============================================================================

/// Stable identifier for a render target, used by the exporter to locate
/// the surface it should capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(u64);

impl TargetHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric part of the handle.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code-preview-{}", self.0)
    }
}

// ============================================================================
// RenderTarget
// ============================================================================

/// The realized visual composition of code + style + background.
///
/// Carries the SVG document and the pixel layout box the capture will
/// reproduce. Cloning is cheap enough that every capture works from its
/// own copy, taken at invocation time.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    handle: TargetHandle,
    svg: String,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// The capture handle identifying this target.
    pub fn handle(&self) -> TargetHandle {
        self.handle
    }

    /// The SVG document realizing the composition.
    pub fn svg_document(&self) -> &str {
        &self.svg
    }

    /// Layout box width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Layout box height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders a configuration into a fresh [`RenderTarget`].
///
/// Deterministic: identical inputs always produce a target with identical
/// visual content. When the paint descriptor is
/// [`PaintDescriptor::Transparent`] the outer background is left unpainted
/// while the theme panel keeps its own background, so a capture yields a
/// transparent-background image rather than failing.
pub fn render(config: &SnapshotConfig, style: &StyleTable, paint: &PaintDescriptor) -> RenderTarget {
    let text = if config.source_text.is_empty() {
        PLACEHOLDER_TEXT
    } else {
        config.source_text.as_str()
    };

    let font_px = config.font_size_px as f32;
    let char_w = font_px * CHAR_ADVANCE_EM;
    let line_h = (font_px * LINE_HEIGHT_EM).ceil();

    let lines = highlight_lines(text, config, style);

    let max_cols = lines
        .iter()
        .map(|tokens| tokens.iter().map(|(_, t)| t.chars().count()).sum::<usize>())
        .max()
        .unwrap_or(1)
        .max(1);
    let n_lines = lines.len().max(1);

    let panel_w = max_cols as f32 * char_w + 2.0 * INNER_PAD;
    let panel_h = n_lines as f32 * line_h + 2.0 * INNER_PAD;
    let width = (panel_w + 2.0 * OUTER_PAD).ceil() as u32;
    let height = (panel_h + 2.0 * OUTER_PAD).ceil() as u32;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    write_background(&mut svg, paint, width, height);

    if let Some(bg) = style.background() {
        let _ = write!(
            svg,
            r#"<rect x="{OUTER_PAD}" y="{OUTER_PAD}" width="{panel_w:.2}" height="{panel_h:.2}" rx="{CORNER_RADIUS}" fill="{}"/>"#,
            color_hex(bg)
        );
    }

    let _ = write!(
        svg,
        r#"<g font-family="monospace" font-size="{font_px}" xml:space="preserve">"#
    );
    for (i, tokens) in lines.iter().enumerate() {
        let y = OUTER_PAD + INNER_PAD + i as f32 * line_h + font_px;
        let _ = write!(svg, r#"<text y="{y:.2}">"#);
        let mut col = 0usize;
        for (token_style, token) in tokens {
            let cols = token.chars().count();
            if cols > 0 {
                let x = OUTER_PAD + INNER_PAD + col as f32 * char_w;
                write_token(&mut svg, token_style, token, x);
                col += cols;
            }
        }
        svg.push_str("</text>");
    }
    svg.push_str("</g></svg>");

    let target = RenderTarget {
        handle: TargetHandle::next(),
        svg,
        width,
        height,
    };
    tracing::debug!(
        handle = %target.handle(),
        width,
        height,
        "rendered preview target"
    );
    target
}

/// Tokenizes and styles the text line by line.
///
/// A line that fails to highlight degrades to a single token in the
/// theme's foreground color; the render itself never fails.
fn highlight_lines(
    text: &str,
    config: &SnapshotConfig,
    style: &StyleTable,
) -> Vec<Vec<(Style, String)>> {
    let syntax = SYNTAXES
        .find_syntax_by_token(config.language.token())
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
    let fallback = Style {
        foreground: style.foreground().unwrap_or(Color::BLACK),
        background: Color {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        },
        font_style: FontStyle::empty(),
    };

    let mut highlighter = HighlightLines::new(syntax, &style.theme);
    LinesWithEndings::from(text)
        .map(|line| {
            let stripped = line.trim_end_matches(['\n', '\r']);
            match highlighter.highlight_line(line, &SYNTAXES) {
                Ok(tokens) => tokens
                    .into_iter()
                    .map(|(s, t)| (s, t.trim_end_matches(['\n', '\r']).to_string()))
                    .collect(),
                Err(_) => vec![(fallback, stripped.to_string())],
            }
        })
        .collect()
}

/// Writes the outer background paint, if any.
fn write_background(svg: &mut String, paint: &PaintDescriptor, width: u32, height: u32) {
    match paint {
        PaintDescriptor::Solid(hex) => {
            let _ = write!(
                svg,
                r#"<rect width="{width}" height="{height}" rx="{CORNER_RADIUS}" fill="{}"/>"#,
                escape_xml(hex)
            );
        }
        PaintDescriptor::Gradient(expr) => {
            let stops = extract_hex_stops(expr);
            if stops.is_empty() {
                // An expression with no resolvable stops paints nothing.
                return;
            }
            svg.push_str(r#"<defs><linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">"#);
            let denom = (stops.len().saturating_sub(1)).max(1) as f32;
            for (i, stop) in stops.iter().enumerate() {
                let offset = i as f32 / denom;
                let _ = write!(svg, r#"<stop offset="{offset:.3}" stop-color="{stop}"/>"#);
            }
            svg.push_str("</linearGradient></defs>");
            let _ = write!(
                svg,
                r#"<rect width="{width}" height="{height}" rx="{CORNER_RADIUS}" fill="url(#bg)"/>"#
            );
        }
        PaintDescriptor::Transparent => {}
    }
}

fn write_token(svg: &mut String, style: &Style, token: &str, x: f32) {
    let _ = write!(
        svg,
        r#"<tspan x="{x:.2}" fill="{}""#,
        color_hex(style.foreground)
    );
    if style.font_style.contains(FontStyle::BOLD) {
        svg.push_str(r#" font-weight="bold""#);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        svg.push_str(r#" font-style="italic""#);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        svg.push_str(r#" text-decoration="underline""#);
    }
    let _ = write!(svg, ">{}</tspan>", escape_xml(token));
}

fn color_hex(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Pulls `#rgb`/`#rrggbb` color stops out of a CSS-like gradient
/// expression. This is the single point where the otherwise-opaque
/// expression is realized as paint; unknown syntax simply yields no stops.
fn extract_hex_stops(expr: &str) -> Vec<String> {
    let bytes = expr.as_bytes();
    let mut stops = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' {
            let run = bytes[i + 1..]
                .iter()
                .take(6)
                .take_while(|b| b.is_ascii_hexdigit())
                .count();
            if run == 6 || run == 3 {
                stops.push(expr[i..i + 1 + run].to_ascii_lowercase());
                i += 1 + run;
                continue;
            }
        }
        i += 1;
    }
    stops
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackgroundSpec;
    use crate::style::resolve_paint;
    use crate::themes;

    fn one_dark() -> StyleTable {
        themes::builtin().resolve("oneDark").unwrap().clone()
    }

    fn solid_white() -> PaintDescriptor {
        resolve_paint(&BackgroundSpec::solid("#ffffff"))
    }

    #[test]
    fn render_is_deterministic() {
        let mut config = SnapshotConfig::default();
        config.source_text = "const x = 1;\nconsole.log(x);".to_string();
        let style = one_dark();
        let paint = solid_white();

        let a = render(&config, &style, &paint);
        let b = render(&config, &style, &paint);

        assert_eq!(a.svg_document(), b.svg_document());
        assert_eq!((a.width(), a.height()), (b.width(), b.height()));
        // Fresh target per render, never merged
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn empty_source_renders_placeholder() {
        let config = SnapshotConfig::default();
        let target = render(&config, &one_dark(), &solid_white());
        assert!(target.svg_document().contains("Your code will appear here"));
        assert!(target.width() > 0 && target.height() > 0);
    }

    #[test]
    fn solid_paint_fills_outer_rect() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x".to_string();
        let target = render(&config, &one_dark(), &solid_white());
        assert!(target.svg_document().contains(r##"fill="#ffffff""##));
    }

    #[test]
    fn transparent_paint_omits_outer_rect_but_keeps_panel() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x".to_string();
        let target = render(&config, &one_dark(), &PaintDescriptor::Transparent);
        let svg = target.svg_document();
        // Exactly one rect: the theme panel
        assert_eq!(svg.matches("<rect").count(), 1);
        assert!(svg.contains(r##"fill="#282c34""##));
    }

    #[test]
    fn gradient_paint_builds_stops() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x".to_string();
        let paint = resolve_paint(&BackgroundSpec::gradient(
            "linear-gradient(135deg, #667EEA 0%, #764ba2 100%)",
        ));
        let target = render(&config, &one_dark(), &paint);
        let svg = target.svg_document();
        assert!(svg.contains("<linearGradient"));
        assert!(svg.contains(r##"stop-color="#667eea""##));
        assert!(svg.contains(r##"stop-color="#764ba2""##));
        assert!(svg.contains(r##"fill="url(#bg)""##));
    }

    #[test]
    fn gradient_without_stops_paints_nothing() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x".to_string();
        let paint = resolve_paint(&BackgroundSpec::gradient("radial-gradient(red, blue)"));
        let target = render(&config, &one_dark(), &paint);
        assert_eq!(target.svg_document().matches("<rect").count(), 1);
    }

    #[test]
    fn dimensions_grow_with_font_size() {
        let mut config = SnapshotConfig::default();
        config.source_text = "let y = 2;".to_string();
        let style = one_dark();
        let paint = solid_white();

        let small = render(&config, &style, &paint);
        config.font_size_px = 32;
        let large = render(&config, &style, &paint);

        assert!(large.width() > small.width());
        assert!(large.height() > small.height());
    }

    #[test]
    fn markup_in_source_is_escaped() {
        let mut config = SnapshotConfig::default();
        config.source_text = "if (a < b && c > d) {}".to_string();
        let target = render(&config, &one_dark(), &solid_white());
        let svg = target.svg_document();
        assert!(svg.contains("&lt;"));
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains("if (a < b"));
    }

    #[test]
    fn handle_formats_as_element_id() {
        let config = SnapshotConfig::default();
        let target = render(&config, &one_dark(), &solid_white());
        assert!(target.handle().to_string().starts_with("code-preview-"));
    }

    #[test]
    fn hex_stop_extraction() {
        assert_eq!(
            extract_hex_stops("linear-gradient(90deg, #FF0000, #abc 50%)"),
            vec!["#ff0000".to_string(), "#abc".to_string()]
        );
        assert!(extract_hex_stops("no stops here #xyz #12").is_empty());
    }
}
