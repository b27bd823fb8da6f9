//! Legacy webpack client-manifest upgrade.
//!
//! Webpack-era client manifests describe output files positionally:
//! flat `all`/`initial`/`async` path lists plus a `modules` table that
//! maps source module ids to numeric indexes into `all`. The upgrade
//! rebuilds the canonical id-keyed map from those lists:
//!
//! - every JS output file becomes an entry under a `_`-prefixed
//!   identifier,
//! - `initial` files mark entry points and attach their CSS/assets to
//!   the first entrypoint,
//! - `async` files become dynamic entry points wired into the first
//!   entrypoint's `dynamicImports` (non-JS async files get a virtual
//!   grouping module so they can still be prefetched),
//! - each `modules` row becomes a virtual module importing its JS
//!   files and owning its CSS/assets.
//!
//! An `initial` or `async` file missing from `all` is the one fatal
//! manifest error: the positional format is self-referential and such
//! a manifest cannot be interpreted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::RendererError;

use super::{Manifest, ResourceMeta, is_css, is_js, parse_resource};

/// The legacy webpack client manifest shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackManifest {
    /// Public URL prefix the client build was emitted under.
    #[serde(default)]
    pub public_path: String,
    /// Every emitted output path.
    #[serde(default)]
    pub all: Vec<String>,
    /// Output paths loaded on initial navigation.
    #[serde(default)]
    pub initial: Vec<String>,
    /// Output paths loaded via dynamic imports.
    #[serde(default, rename = "async")]
    pub async_files: Vec<String>,
    /// Source module id to indexes into `all`.
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<usize>>,
}

/// Detect the legacy webpack shape in a raw JSON document.
///
/// The decision is made once at ingestion; the resolver only ever sees
/// the canonical map.
pub fn is_legacy_manifest(raw: &serde_json::Value) -> bool {
    raw.get("all").is_some() && raw.get("initial").is_some()
}

/// Identifier assigned to an output file in the upgraded manifest.
fn identifier(outfile: &str) -> String {
    format!("_{outfile}")
}

/// Upgrade a legacy webpack client manifest to the canonical format.
pub fn normalize_webpack_manifest(manifest: &WebpackManifest) -> Result<Manifest, RendererError> {
    let mut canonical = Manifest::new();

    // Initialize with all JS output files.
    for outfile in &manifest.all {
        if is_js(outfile) {
            canonical.insert(identifier(outfile), ResourceMeta::from_path(outfile));
        }
    }

    // The first initial JS file receives the manifest-wide extra data:
    // initial CSS/assets and the dynamic import list.
    let first = manifest.initial.iter().find(|f| is_js(f)).map(|f| identifier(f));
    if let Some(first) = &first {
        if !canonical.contains(first) {
            return Err(RendererError::invalid_manifest(format!(
                "initial entrypoint not in `all`: {}",
                &first[1..]
            )));
        }
    }

    // Collected here and attached to the first entrypoint in one pass
    // once both loops are done, keeping the map borrows simple.
    let mut first_css = Vec::new();
    let mut first_assets = Vec::new();
    let mut first_dynamic = Vec::new();

    for outfile in &manifest.initial {
        if is_js(outfile) {
            let id = identifier(outfile);
            let meta = canonical.0.get_mut(&id).ok_or_else(|| {
                RendererError::invalid_manifest(format!("initial module not in `all`: {outfile}"))
            })?;
            meta.is_entry = true;
        } else if first.is_some() {
            if is_css(outfile) {
                first_css.push(outfile.clone());
            } else {
                first_assets.push(outfile.clone());
            }
            canonical.insert(outfile.clone(), ResourceMeta::from_path(outfile));
        }
    }

    for outfile in &manifest.async_files {
        if is_js(outfile) {
            let id = identifier(outfile);
            let meta = canonical.0.get_mut(&id).ok_or_else(|| {
                RendererError::invalid_manifest(format!("async module not in `all`: {outfile}"))
            })?;
            meta.is_dynamic_entry = true;
            first_dynamic.push(id);
        } else if first.is_some() {
            // Non-JS async files get a virtual grouping module so they
            // can still be reached for prefetching.
            let id = identifier(outfile);
            let mut virtual_meta = ResourceMeta::default();
            if is_css(outfile) {
                virtual_meta.css.push(outfile.clone());
            } else {
                virtual_meta.assets.push(outfile.clone());
            }
            canonical.insert(id.clone(), virtual_meta);
            canonical.insert(outfile.clone(), ResourceMeta::from_path(outfile));
            first_dynamic.push(id);
        }
    }

    if let Some(first) = &first {
        if let Some(meta) = canonical.0.get_mut(first) {
            meta.css.extend(first_css);
            meta.assets.extend(first_assets);
            meta.dynamic_imports.extend(first_dynamic);
        }
    }

    // Map source modules to virtual entries over their output files.
    for (module_id, indexes) in &manifest.modules {
        let mapped: Vec<&String> =
            indexes.iter().filter_map(|&index| manifest.all.get(index)).collect();
        let js_files: Vec<&String> = mapped.iter().filter(|f| is_js(f)).copied().collect();

        for file in &js_files {
            let id = identifier(file);
            match canonical.0.get_mut(&id) {
                Some(meta) => meta.file = (*file).clone(),
                None => {
                    canonical.insert(id, ResourceMeta::from_path(file));
                }
            }
        }

        let parsed = parse_resource(module_id);
        canonical.insert(
            module_id.clone(),
            ResourceMeta {
                module: parsed.is_module,
                resource_type: parsed.resource_type,
                mime_type: parsed.mime_type,
                imports: js_files.iter().map(|f| identifier(f)).collect(),
                css: mapped.iter().filter(|f| is_css(f)).map(|f| (*f).clone()).collect(),
                assets: mapped
                    .iter()
                    .filter(|f| !is_js(f) && !is_css(f))
                    .map(|f| (*f).clone())
                    .collect(),
                ..ResourceMeta::default()
            },
        );
    }

    debug!(
        modules = canonical.len(),
        entrypoints = canonical.entrypoints().len(),
        "upgraded legacy webpack manifest"
    );

    Ok(canonical)
}
