//! Error types for bundle-renderer operations.
//!
//! The crate deliberately has few failure modes: dependency resolution
//! itself never fails (dangling references and cycles degrade to empty
//! contributions), so errors only surface at the boundaries — renderer
//! construction, legacy manifest upgrades, and precompute file I/O.
//!
//! # Error Categories
//!
//! - **Configuration**: [`RendererError::MissingManifest`] — neither a
//!   manifest nor a precomputed table was supplied when constructing a
//!   renderer context. This is the one user-facing fatal condition.
//! - **Ingestion**: [`RendererError::InvalidManifest`] — a legacy
//!   webpack client manifest references files outside its own `all`
//!   list and cannot be upgraded.
//! - **I/O and parsing**: [`RendererError::Io`] and
//!   [`RendererError::Json`] — automatic conversions for callers that
//!   load manifests or precomputed tables themselves and want a single
//!   error type for the whole pipeline.

use thiserror::Error;

/// The main error type for bundle-renderer operations.
///
/// Downstream rendering failures (the caller's app-creation or
/// body-rendering callbacks) are *not* represented here; they propagate
/// unchanged as [`anyhow::Error`] through the render facade.
#[derive(Error, Debug)]
pub enum RendererError {
    /// Neither a manifest nor a precomputed dependency table was
    /// provided when constructing a renderer context.
    ///
    /// The renderer refuses to construct rather than failing later
    /// mid-request, so misconfiguration surfaces at deploy time.
    #[error("either a manifest or precomputed dependency data must be provided")]
    MissingManifest,

    /// A manifest could not be upgraded to the canonical format.
    ///
    /// Raised by the legacy webpack upgrade when an `initial` or
    /// `async` file is missing from the manifest's `all` list.
    #[error("invalid manifest: {reason}")]
    InvalidManifest {
        /// Why the manifest was rejected.
        reason: String,
    },

    /// An I/O error while reading or writing a manifest or precomputed
    /// dependency file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document failed to parse or serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RendererError {
    /// Construct an [`RendererError::InvalidManifest`] from anything
    /// displayable.
    pub fn invalid_manifest(reason: impl std::fmt::Display) -> Self {
        Self::InvalidManifest {
            reason: reason.to_string(),
        }
    }
}
