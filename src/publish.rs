//! Remote publisher: uploads an export artifact to an object store and
//! returns a durable link.
//!
//! This is the only component that crosses a trust/network boundary. A
//! failed publish is surfaced to the caller and never retried silently;
//! distinguishing a remote rejection (`UploadRejected`, carrying the
//! remote's own payload) from a transport failure (`UploadUnreachable`)
//! is part of the contract.

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::export::ExportArtifact;

// ============================================================================
// PublishedLink
// ============================================================================

/// The durable URL returned after a successful upload.
///
/// Its lifetime is independent of the artifact that produced it: the link
/// may outlive the session, the artifact does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedLink {
    url: String,
}

impl PublishedLink {
    /// Creates a link from a URL string.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The link URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

// ============================================================================
// PublisherConfig
// ============================================================================

/// Environment-supplied upload endpoint configuration.
///
/// The endpoint base address and the pre-shared upload policy identifier
/// are deployment configuration, not user input.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Object-storage endpoint accepting multipart POSTs.
    pub endpoint: Url,
    /// Pre-shared upload policy identifier sent with every upload.
    pub upload_policy: String,
}

impl PublisherConfig {
    /// Creates a config from explicit values.
    pub fn new(endpoint: Url, upload_policy: impl Into<String>) -> Self {
        Self {
            endpoint,
            upload_policy: upload_policy.into(),
        }
    }

    /// Reads the endpoint from `CODESHOT_UPLOAD_URL` and the policy id
    /// from `CODESHOT_UPLOAD_POLICY`. Returns `None` when either is
    /// missing or the URL does not parse.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("CODESHOT_UPLOAD_URL").ok()?;
        let upload_policy = std::env::var("CODESHOT_UPLOAD_POLICY").ok()?;
        let endpoint = Url::parse(&endpoint).ok()?;
        Some(Self::new(endpoint, upload_policy))
    }
}

/// Success body returned by the object store.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

// ============================================================================
// Publisher
// ============================================================================

/// Uploads export artifacts to the configured object store.
pub struct Publisher {
    client: reqwest::Client,
    config: PublisherConfig,
}

impl Publisher {
    /// Creates a publisher with its own HTTP client.
    pub fn new(config: PublisherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn user_agent() -> &'static str {
        concat!("codeshot-renderer/", env!("CARGO_PKG_VERSION"))
    }

    /// Uploads the artifact as a multipart form and returns the durable
    /// link from the store's response.
    ///
    /// The form carries the image bytes as the `file` part (named after
    /// the artifact's download convention) and the upload policy id as
    /// `upload_preset`. Never retried: a failure is returned as-is.
    pub async fn publish(&self, artifact: &ExportArtifact) -> Result<PublishedLink> {
        let part = reqwest::multipart::Part::bytes(artifact.bytes().to_vec())
            .file_name(artifact.file_name())
            .mime_str(artifact.mime_type())?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_policy.clone());

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "upload rejected by remote store");
            return Err(Error::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(parsed) => {
                tracing::debug!(url = %parsed.secure_url, "artifact published");
                Ok(PublishedLink::new(parsed.secure_url))
            }
            // The remote answered, so a malformed success body is a
            // rejection rather than a transport failure.
            Err(_) => Err(Error::UploadRejected {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
