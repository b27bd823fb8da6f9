//! Load and save precomputed dependency bundles.
//!
//! Bundles are plain JSON documents, written at build time and loaded
//! once at server startup.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::PrecomputedData;

impl PrecomputedData {
    /// Load a precomputed bundle from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read precomputed data from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse precomputed data in {}", path.display()))
    }

    /// Save a precomputed bundle to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("failed to serialize precomputed data")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write precomputed data to {}", path.display()))
    }
}
