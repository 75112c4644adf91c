//! Snapshot pipeline: the stateful session facade.
//!
//! A [`SnapshotPipeline`] owns the configuration store, the injected theme
//! catalog, the current render target, and the share controller, and drives
//! the session lifecycle: Idle until the first render, Rendering while the
//! target is stale, Ready once a target exists, Publishing during an upload,
//! Linked once a durable link is held.
//!
//! Configuration mutations invalidate the current target; the next
//! [`refresh`](SnapshotPipeline::refresh) recomputes it from scratch.
//! Captures clone the target at the point of invocation, so an export in
//! flight is unaffected by later mutations.

use crate::config::{BackgroundSpec, SnapshotConfig, SnapshotStore};
use crate::error::{Error, Result};
use crate::export::{capture, ExportArtifact};
use crate::publish::{PublishedLink, Publisher};
use crate::render::{render, RenderTarget};
use crate::share::{Clipboard, ShareController};
use crate::style::{resolve_paint, PaintDescriptor, ThemeCatalog};

// ============================================================================
// PipelineState
// ============================================================================

/// Lifecycle phase of a snapshot session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No render has happened yet.
    Idle,
    /// The configuration changed since the last render; the current target
    /// is stale and has been dropped.
    Rendering,
    /// A render target exists and matches the configuration.
    Ready,
    /// An upload is in flight.
    Publishing,
    /// The last upload succeeded and its link is held by the share dialog.
    Linked,
}

// ============================================================================
// SnapshotPipeline
// ============================================================================

/// Stateful facade over one code-snapshot editing session.
///
/// # Example
///
/// ```no_run
/// use codeshot_renderer::{themes, MemoryClipboard, SnapshotPipeline};
///
/// # async fn demo() -> codeshot_renderer::Result<()> {
/// let mut pipeline = SnapshotPipeline::new(
///     themes::builtin(),
///     Box::new(MemoryClipboard::new()),
/// );
/// pipeline.set_source_text("const x = 1;");
/// pipeline.refresh()?;
/// let artifact = pipeline.export_as_image().await?;
/// assert_eq!(artifact.mime_type(), "image/png");
/// # Ok(())
/// # }
/// ```
pub struct SnapshotPipeline {
    store: SnapshotStore,
    catalog: ThemeCatalog,
    target: Option<RenderTarget>,
    state: PipelineState,
    share: ShareController,
}

impl SnapshotPipeline {
    /// Creates an idle pipeline with the default configuration.
    pub fn new(catalog: ThemeCatalog, clipboard: Box<dyn Clipboard>) -> Self {
        Self::with_config(SnapshotConfig::default(), catalog, clipboard)
    }

    /// Creates an idle pipeline from an existing configuration.
    pub fn with_config(
        config: SnapshotConfig,
        catalog: ThemeCatalog,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            store: SnapshotStore::with_config(config),
            catalog,
            target: None,
            state: PipelineState::Idle,
            share: ShareController::new(clipboard),
        }
    }

    /// The current lifecycle phase.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The current configuration.
    pub fn config(&self) -> &SnapshotConfig {
        self.store.config()
    }

    /// The injected theme catalog.
    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    /// The current render target, if one exists and is not stale.
    pub fn render_target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// The share dialog controller.
    pub fn share(&self) -> &ShareController {
        &self.share
    }

    /// Mutable access to the share dialog controller.
    pub fn share_mut(&mut self) -> &mut ShareController {
        &mut self.share
    }

    fn invalidate(&mut self) {
        self.target = None;
        self.state = PipelineState::Rendering;
    }

    // ------------------------------------------------------------------------
    // Configuration mutation
    // ------------------------------------------------------------------------

    /// Replaces the source text. Returns true if it changed.
    pub fn set_source_text(&mut self, text: impl Into<String>) -> bool {
        let changed = self.store.set_source_text(text);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Sets the language from a loose tag. Unknown tags are a no-op.
    pub fn set_language(&mut self, tag: &str) -> bool {
        let changed = self.store.set_language(tag);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Sets the theme id. Ids absent from the catalog are a no-op.
    pub fn set_theme(&mut self, theme_id: &str) -> bool {
        let changed = self.store.set_theme(theme_id, &self.catalog);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Sets the font size from raw user input, coercing invalid values.
    pub fn set_font_size(&mut self, raw: &str) -> bool {
        let changed = self.store.set_font_size(raw);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Replaces the background specification. Returns true if it changed.
    pub fn set_background(&mut self, background: BackgroundSpec) -> bool {
        let changed = self.store.set_background(background);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Flips background visibility.
    pub fn toggle_background_visible(&mut self) -> bool {
        let changed = self.store.toggle_background_visible();
        if changed {
            self.invalidate();
        }
        changed
    }

    // ------------------------------------------------------------------------
    // Rendering and capture
    // ------------------------------------------------------------------------

    /// Ensures a render target exists for the current configuration and
    /// returns it.
    ///
    /// A cached target is returned as-is; a stale or absent one is
    /// recomputed from the configuration, the resolved style table, and
    /// the resolved background paint. When the background is hidden the
    /// paint resolves to transparent regardless of the configured spec.
    pub fn refresh(&mut self) -> Result<&RenderTarget> {
        let target = match self.target.take() {
            Some(target) => target,
            None => {
                let config = self.store.config();
                let style = self.catalog.resolve(&config.theme_id)?;
                let paint = if config.background_visible {
                    resolve_paint(&config.background)
                } else {
                    PaintDescriptor::Transparent
                };
                let target = render(config, style, &paint);
                tracing::debug!(handle = %target.handle(), "render target refreshed");
                self.state = PipelineState::Ready;
                target
            }
        };
        Ok(self.target.insert(target))
    }

    /// Captures the current render target as an encoded PNG artifact.
    ///
    /// Fails with [`Error::TargetNotFound`] when no target exists. The
    /// target is cloned at invocation, so exports may overlap each other
    /// and subsequent configuration changes.
    pub async fn export_as_image(&self) -> Result<ExportArtifact> {
        let target = self.target.clone().ok_or(Error::TargetNotFound)?;
        capture(target).await
    }

    // ------------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------------

    /// Captures the current target and uploads it through the publisher.
    ///
    /// The share dialog is closed for the duration of the cycle. On success
    /// it reopens holding the fresh link; on failure it stays closed, any
    /// previously published link is retained, and the error is returned to
    /// the caller unretried.
    pub async fn upload_to_cloud(&mut self, publisher: &Publisher) -> Result<PublishedLink> {
        let target = self.target.clone().ok_or(Error::TargetNotFound)?;
        self.share.reset_for_publish();
        self.state = PipelineState::Publishing;

        let result = async {
            let artifact = capture(target).await?;
            publisher.publish(&artifact).await
        }
        .await;

        match result {
            Ok(link) => {
                self.state = PipelineState::Linked;
                self.share.open_with_link(link.clone());
                Ok(link)
            }
            Err(error) => {
                tracing::warn!(%error, "publish cycle failed");
                self.state = PipelineState::Ready;
                Err(error)
            }
        }
    }

    /// Closes the share dialog and discards the held link.
    pub fn close_share_dialog(&mut self) {
        self.share.close();
        if self.state == PipelineState::Linked {
            self.state = PipelineState::Ready;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
