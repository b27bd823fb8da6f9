//! Manifest file loading with format detection.
//!
//! Format detection runs once, on the raw JSON document: the legacy
//! webpack shape is upgraded, anything else is treated as a Vite or
//! already-canonical manifest and normalized.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{Manifest, is_legacy_manifest, normalize_vite_manifest, normalize_webpack_manifest};

impl Manifest {
    /// Load a manifest from disk, detect its format, and normalize it
    /// to the canonical shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest from {}", path.display()))?;
        let raw: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse manifest in {}", path.display()))?;

        if is_legacy_manifest(&raw) {
            debug!(path = %path.display(), "detected legacy webpack manifest");
            let legacy = serde_json::from_value(raw)
                .with_context(|| format!("failed to parse webpack manifest in {}", path.display()))?;
            normalize_webpack_manifest(&legacy)
                .with_context(|| format!("failed to upgrade webpack manifest in {}", path.display()))
        } else {
            let manifest: Manifest = serde_json::from_value(raw)
                .with_context(|| format!("failed to parse manifest in {}", path.display()))?;
            Ok(normalize_vite_manifest(&manifest))
        }
    }
}
