//! Raster exporter: captures a render target as an encoded PNG.
//!
//! The capture contract wraps the rasterization primitive (resvg over the
//! target's SVG document) and enforces the error taxonomy: an absent target
//! is `TargetNotFound` (reported by the pipeline before calling in here),
//! everything the rasterizer or encoder can throw becomes `CaptureFailed`.
//! Each call works on its own copy of the target, so captures may overlap
//! freely with configuration mutation and with each other.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use once_cell::sync::Lazy;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, Options, Tree};

use crate::error::{Error, Result};
use crate::render::RenderTarget;

/// Download convention for locally exported artifacts.
pub const EXPORT_FILE_NAME: &str = "code.png";

/// MIME type of the encoded capture.
pub const EXPORT_MIME_TYPE: &str = "image/png";

/// Upper bound on the capture surface, in pixels. Surfaces above this are
/// refused rather than handed to the rasterizer.
const MAX_SURFACE_AREA: u64 = 16_000_000;

static FONTDB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

// ============================================================================
// ExportArtifact
// ============================================================================

/// An encoded image produced from a [`RenderTarget`].
///
/// Immutable; has no identity beyond its content. The artifact's lifetime
/// is independent of any link later published from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ExportArtifact {
    /// The encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the artifact, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The artifact's MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File name under which the artifact is offered on local export.
    pub fn file_name(&self) -> &'static str {
        EXPORT_FILE_NAME
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Captures a render target into an encoded PNG artifact.
///
/// Suspending: the CPU-bound rasterize/encode runs on the blocking pool.
/// On success the decoded pixel dimensions equal the target's layout box.
pub async fn capture(target: RenderTarget) -> Result<ExportArtifact> {
    let handle = target.handle();
    let result = tokio::task::spawn_blocking(move || rasterize(&target))
        .await
        .map_err(|e| Error::CaptureFailed(format!("capture task failed: {e}")))?;

    match &result {
        Ok(artifact) => {
            tracing::debug!(handle = %handle, bytes = artifact.bytes().len(), "captured artifact");
        }
        Err(error) => {
            tracing::warn!(handle = %handle, %error, "capture failed");
        }
    }
    result
}

fn rasterize(target: &RenderTarget) -> Result<ExportArtifact> {
    let area = u64::from(target.width()) * u64::from(target.height());
    if area == 0 || area > MAX_SURFACE_AREA {
        return Err(Error::CaptureFailed(format!(
            "capture surface {}x{} is outside supported bounds",
            target.width(),
            target.height()
        )));
    }

    let mut options = Options::default();
    options.fontdb = Arc::clone(&FONTDB);
    let tree = Tree::from_str(target.svg_document(), &options)
        .map_err(|e| Error::CaptureFailed(format!("invalid visual tree: {e}")))?;

    let mut pixmap = Pixmap::new(target.width(), target.height())
        .ok_or_else(|| Error::CaptureFailed("could not allocate capture surface".to_string()))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let image = pixmap_to_rgba(&pixmap);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::CaptureFailed(format!("png encode failed: {e}")))?;

    Ok(ExportArtifact {
        bytes,
        mime_type: EXPORT_MIME_TYPE.to_string(),
    })
}

/// Converts the premultiplied tiny-skia pixmap into a straight-alpha RGBA
/// image for encoding.
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, out) in pixmap.pixels().iter().zip(image.pixels_mut()) {
        let c = pixel.demultiply();
        out.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    image
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackgroundSpec, SnapshotConfig};
    use crate::render::render;
    use crate::style::{resolve_paint, PaintDescriptor};
    use crate::themes;

    const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

    fn target_for(config: &SnapshotConfig) -> crate::render::RenderTarget {
        let catalog = themes::builtin();
        let style = catalog.resolve(&config.theme_id).unwrap();
        let paint = if config.background_visible {
            resolve_paint(&config.background)
        } else {
            PaintDescriptor::Transparent
        };
        render(config, style, &paint)
    }

    #[tokio::test]
    async fn capture_produces_png_artifact() {
        let mut config = SnapshotConfig::default();
        config.source_text = "const x = 1;".to_string();
        let target = target_for(&config);

        let artifact = capture(target).await.unwrap();
        assert!(!artifact.bytes().is_empty());
        assert_eq!(artifact.mime_type(), EXPORT_MIME_TYPE);
        assert_eq!(artifact.file_name(), "code.png");
        assert_eq!(&artifact.bytes()[..4], &PNG_SIGNATURE);
    }

    #[tokio::test]
    async fn decoded_dimensions_match_layout_box() {
        let mut config = SnapshotConfig::default();
        config.source_text = "fn main() {}".to_string();
        config.language = crate::config::Language::Rust;
        let target = target_for(&config);
        let (w, h) = (target.width(), target.height());

        let artifact = capture(target).await.unwrap();
        let decoded = image::load_from_memory(artifact.bytes()).unwrap();
        assert_eq!(decoded.width(), w);
        assert_eq!(decoded.height(), h);
    }

    #[tokio::test]
    async fn hidden_background_captures_transparent() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x = 1".to_string();
        config.background = BackgroundSpec::gradient("linear-gradient(90deg, #ff0000, #0000ff)");
        config.background_visible = false;
        let target = target_for(&config);

        let artifact = capture(target).await.unwrap();
        let decoded = image::load_from_memory(artifact.bytes()).unwrap().to_rgba8();
        // Outer margin is unpainted regardless of the configured spec
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[tokio::test]
    async fn visible_background_captures_opaque_corner() {
        let mut config = SnapshotConfig::default();
        config.source_text = "x = 1".to_string();
        let target = target_for(&config);

        let artifact = capture(target).await.unwrap();
        let decoded = image::load_from_memory(artifact.bytes()).unwrap().to_rgba8();
        // Center of the top edge sits inside the rounded background rect
        let pixel = decoded.get_pixel(decoded.width() / 2, 1).0;
        assert_eq!(pixel, [255, 255, 255, 255]);
    }

    #[tokio::test]
    async fn capture_is_deterministic() {
        let mut config = SnapshotConfig::default();
        config.source_text = "let a = [1, 2, 3];".to_string();

        let first = capture(target_for(&config)).await.unwrap();
        let second = capture(target_for(&config)).await.unwrap();
        assert_eq!(first.bytes(), second.bytes());
    }

    #[tokio::test]
    async fn overlapping_captures_settle_independently() {
        let mut config = SnapshotConfig::default();
        config.source_text = "a".to_string();
        let small = target_for(&config);
        config.source_text = "a much longer line of code here".to_string();
        let wide = target_for(&config);
        let wide_width = wide.width();

        let (a, b) = tokio::join!(capture(small), capture(wide));
        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.bytes(), b.bytes());
        let decoded = image::load_from_memory(b.bytes()).unwrap();
        assert_eq!(decoded.width(), wide_width);
    }

    #[tokio::test]
    async fn oversized_surface_is_refused() {
        let mut config = SnapshotConfig::default();
        config.font_size_px = 96;
        let line = "x".repeat(500);
        config.source_text = vec![line; 100].join("\n");
        let target = target_for(&config);

        match capture(target).await {
            Err(Error::CaptureFailed(msg)) => assert!(msg.contains("bounds")),
            other => panic!("expected CaptureFailed, got {other:?}"),
        }
    }
}
