//! codeshot-renderer: Deterministic code snapshot rendering and publishing
//!
//! This crate turns a snapshot configuration (source text, language, theme,
//! font size, background) into a styled preview, captures it as a PNG, and
//! optionally publishes the artifact to a remote object store for sharing.
//!
//! # Example
//!
//! ```no_run
//! use codeshot_renderer::{themes, MemoryClipboard, SnapshotPipeline};
//!
//! # async fn demo() -> codeshot_renderer::Result<()> {
//! let mut pipeline = SnapshotPipeline::new(
//!     themes::builtin(),
//!     Box::new(MemoryClipboard::new()),
//! );
//!
//! // Edit the configuration through validating setters
//! pipeline.set_source_text("const greet = () => 'hello';");
//! pipeline.set_theme("dracula");
//! pipeline.set_font_size("18");
//!
//! // Render, then capture a PNG artifact
//! pipeline.refresh()?;
//! let artifact = pipeline.export_as_image().await?;
//! std::fs::write(artifact.file_name(), artifact.bytes()).ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Publishing
//!
//! Uploads go through a [`Publisher`] configured with an endpoint and a
//! pre-shared upload policy; a successful cycle opens the share dialog
//! holding the durable link:
//!
//! ```no_run
//! use codeshot_renderer::{Publisher, PublisherConfig};
//!
//! # async fn demo(pipeline: &mut codeshot_renderer::SnapshotPipeline)
//! # -> codeshot_renderer::Result<()> {
//! let config = PublisherConfig::from_env().expect("upload env not set");
//! let publisher = Publisher::new(config)?;
//!
//! let link = pipeline.upload_to_cloud(&publisher).await?;
//! pipeline.share_mut().copy();
//! println!("published at {}", link.url());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod export;
mod pipeline;
mod publish;
mod render;
mod share;
mod style;
pub mod themes;

pub use config::{
    coerce_font_size, BackgroundSpec, Language, SnapshotConfig, SnapshotStore, DEFAULT_FONT_SIZE,
    MAX_FONT_SIZE, MIN_FONT_SIZE,
};
pub use error::{Error, Result};
pub use export::{capture, ExportArtifact, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use pipeline::{PipelineState, SnapshotPipeline};
pub use publish::{PublishedLink, Publisher, PublisherConfig};
pub use render::{render, RenderTarget, TargetHandle, PLACEHOLDER_TEXT};
pub use share::{Clipboard, MemoryClipboard, ShareController, COPY_ACK_DURATION};
pub use style::{resolve_paint, PaintDescriptor, StyleTable, ThemeCatalog};
