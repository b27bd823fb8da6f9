//! Vite manifest normalization.
//!
//! A Vite client manifest is already keyed by module id, but its
//! entries lack the classification fields the renderer needs and its
//! `css`/`assets` lists reference raw output paths that have no
//! manifest entry of their own. Normalization fills both gaps once, so
//! the resolver never touches extension heuristics at request time.

use tracing::trace;

use super::{Manifest, ResourceMeta, parse_resource};

/// Normalize a Vite (or already-canonical) manifest.
///
/// For every entry, classification fields that the source manifest did
/// not set (`resourceType`, `mimeType`, `module`) are derived from the
/// output path, falling back to the manifest key for virtual modules.
/// Raw paths referenced from `css`/`assets` lists gain synthesized
/// entries so that style and asset lookups during resolution always
/// succeed.
pub fn normalize_vite_manifest(manifest: &Manifest) -> Manifest {
    let mut normalized = Manifest::new();

    for (id, chunk) in manifest.iter() {
        let source_path = if chunk.file.is_empty() { id } else { &chunk.file };
        let parsed = parse_resource(source_path);

        let mut meta = chunk.clone();
        meta.module = meta.module || parsed.is_module;
        if meta.resource_type.is_none() {
            meta.resource_type = parsed.resource_type;
        }
        if meta.mime_type.is_none() {
            meta.mime_type = parsed.mime_type;
        }
        normalized.insert(id.clone(), meta);
    }

    // Synthesize entries for raw css/asset paths without their own key.
    for (_, chunk) in manifest.iter() {
        for item in chunk.css.iter().chain(chunk.assets.iter()) {
            if !normalized.contains(item) {
                trace!(id = %item, "synthesizing manifest entry for raw path");
                normalized.insert(item.clone(), ResourceMeta::from_path(item));
            }
        }
    }

    normalized
}
