//! Error types for the snapshot pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering, capturing, or publishing a
/// code snapshot.
///
/// All variants are recoverable: the configuration store and preview
/// renderer stay usable after any of them.
#[derive(Error, Debug)]
pub enum Error {
    /// A theme id was requested that the catalog does not contain.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// Capture was requested before any render target existed, or the
    /// handle no longer resolves to a live target.
    #[error("no render target is available to capture")]
    TargetNotFound,

    /// The rasterization step failed (unparsable visual tree, oversized
    /// surface, or an encoding error).
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The remote store answered with a non-success status. The remote's
    /// own error payload is carried for diagnostics.
    #[error("upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },

    /// The remote store could not be reached at the transport level
    /// (timeout, DNS failure, connection reset).
    #[error("upload endpoint unreachable: {0}")]
    UploadUnreachable(#[from] reqwest::Error),
}
