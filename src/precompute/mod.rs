//! Ahead-of-time dependency precomputation.
//!
//! A running server does not need the full manifest: resolution is a
//! pure function of it, so the per-module dependency table the
//! resolver's cache converges to can be computed once at build time,
//! serialized, and shipped instead. [`precompute`] runs the resolver
//! over every module in a manifest and bundles:
//!
//! - the flattened dependency table,
//! - the entry-point id list,
//! - slim per-module metadata (output path, classification, dynamic
//!   imports) — everything aggregation still needs at request time.
//!
//! A [`crate::resolver::RendererContext`] accepts this bundle as its
//! substrate and produces output identical to the live-manifest path;
//! that equivalence is a contract, not an optimization, and is covered
//! by the integration suite.
//!
//! The preload policy is baked in at precompute time (the default:
//! per-resource override flag, then modules/scripts/styles). A custom
//! `should_preload` hook therefore only affects live-manifest
//! contexts; the prefetch filter runs during aggregation and applies
//! to both substrates.

pub mod io;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::manifest::{Manifest, ResourceMeta, ResourceType};
use crate::resolver::{ModuleDependencies, default_should_preload, resolve_module};

/// Per-module metadata retained at runtime after the manifest itself
/// is discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlimResourceMeta {
    /// Output path of the built artifact.
    #[serde(default)]
    pub file: String,
    /// Resource classification for `as=` attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    /// MIME type for `type=` attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// True if the script loads as an ES module.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub module: bool,
    /// Dynamic import edges, needed for the aggregator's one-hop
    /// prefetch demotion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_imports: Vec<String>,
}

impl From<&ResourceMeta> for SlimResourceMeta {
    fn from(meta: &ResourceMeta) -> Self {
        Self {
            file: meta.file.clone(),
            resource_type: meta.resource_type,
            mime_type: meta.mime_type.clone(),
            module: meta.module,
            dynamic_imports: meta.dynamic_imports.clone(),
        }
    }
}

/// Serializable bundle produced by [`precompute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecomputedData {
    /// Pre-resolved dependencies for every module id in the manifest.
    pub dependencies: BTreeMap<String, ModuleDependencies>,
    /// Entry-point module ids.
    pub entrypoints: Vec<String>,
    /// Slim per-module metadata needed at request time.
    pub modules: BTreeMap<String, SlimResourceMeta>,
}

/// Run the resolver over an entire manifest, producing the flattened
/// table a server can use in place of the manifest.
///
/// Uses the same walk (and the same cycle guard) as live resolution,
/// so for any module id the table entry equals what a live context
/// would cache.
pub fn precompute(manifest: &Manifest) -> PrecomputedData {
    let mut dependencies = BTreeMap::new();
    let mut in_progress = HashSet::new();

    for id in manifest.iter().map(|(id, _)| id) {
        resolve_module(
            manifest,
            id,
            &mut dependencies,
            &mut in_progress,
            &default_should_preload,
        );
    }

    let entrypoints = manifest.entrypoints();
    let modules = manifest
        .iter()
        .map(|(id, meta)| (id.clone(), SlimResourceMeta::from(meta)))
        .collect();

    debug!(
        modules = manifest.len(),
        entrypoints = entrypoints.len(),
        "precomputed manifest dependencies"
    );

    PrecomputedData {
        dependencies,
        entrypoints,
        modules,
    }
}
