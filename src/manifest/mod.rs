//! Build manifest model and ingestion for bundle-renderer.
//!
//! A manifest is the JSON document a bundler emits describing every
//! built artifact: its output path, its static and dynamic imports,
//! the stylesheets and static assets that belong to it, and whether it
//! is a page entry point. The dependency resolver walks this structure;
//! everything else in the crate is a projection of it.
//!
//! # Canonical format
//!
//! The canonical shape is a map from module id to [`ResourceMeta`],
//! closely following the Vite client manifest with a few augmentations
//! (`module`, `resourceType`, `mimeType`, `sideEffects`, and the
//! per-resource `preload`/`prefetch` override flags).
//!
//! # Ingestion
//!
//! Two normalizers upgrade bundler-native shapes into the canonical
//! map, decided once at ingestion so the resolver only ever sees
//! canonical data:
//!
//! - [`normalize_vite_manifest`] fills in classification fields
//!   ([`ResourceType`], MIME type, module-ness) derived from file
//!   extensions, and synthesizes entries for raw CSS/asset paths that
//!   appear in `css`/`assets` lists without their own manifest key.
//! - [`normalize_webpack_manifest`] upgrades the legacy webpack client
//!   manifest (`all`/`initial`/`async` file lists plus numeric module
//!   indexes) into the canonical map, detected via
//!   [`is_legacy_manifest`].
//!
//! # Integration
//!
//! Works with [`crate::resolver`] for dependency resolution and
//! [`crate::precompute`] for ahead-of-time flattening.

pub mod io;
pub mod resource;
pub mod vite;
pub mod webpack;


use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use resource::{ParsedResource, is_css, is_js, parse_resource};
pub use vite::normalize_vite_manifest;
pub use webpack::{WebpackManifest, is_legacy_manifest, normalize_webpack_manifest};

/// Resource classification used for `as=` attributes on preload and
/// prefetch hints, and for crossorigin policy.
///
/// Derived once from the file extension during ingestion, never
/// recomputed per request. Values mirror the set of content types the
/// platform accepts for `<link rel=preload as=...>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Audio file (mp3, wav, ogg, ...).
    Audio,
    /// HTML document, for frames.
    Document,
    /// Embedded resource.
    Embed,
    /// Resource fetched via fetch/XHR.
    Fetch,
    /// Font file (woff2, ttf, ...).
    Font,
    /// Image file (png, svg, webp, ...).
    Image,
    /// Generic object element resource.
    Object,
    /// JavaScript file.
    Script,
    /// Stylesheet.
    Style,
    /// Text track (subtitles).
    Track,
    /// Web worker script.
    Worker,
    /// Video file (mp4, webm, ...).
    Video,
}

impl ResourceType {
    /// The lowercase wire name, as used in `as=` attributes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Embed => "embed",
            Self::Fetch => "fetch",
            Self::Font => "font",
            Self::Image => "image",
            Self::Object => "object",
            Self::Script => "script",
            Self::Style => "style",
            Self::Track => "track",
            Self::Worker => "worker",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Metadata for one built artifact, keyed by module id in a [`Manifest`].
///
/// Every optional list defaults to an empty vector and every flag to
/// `false`, so resolution logic never has to distinguish "absent" from
/// "empty".
///
/// A `file` of `""` marks a *virtual* module: one that exists only to
/// group dependencies (for example a dynamic-import placeholder created
/// by the webpack upgrade) and never emits a tag of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    /// Source path the artifact was built from, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Bundler-assigned chunk name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Output path of the built artifact. Empty for virtual modules.
    #[serde(default)]
    pub file: String,

    /// Module ids of stylesheets belonging to this module.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,

    /// Module ids of static assets belonging to this module.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,

    /// True if this module is a page entry point.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_entry: bool,

    /// True if this module is reachable only via a dynamic import.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_dynamic_entry: bool,

    /// True if the module has load-time side effects (e.g. a runtime
    /// chunk) and must always be emitted as a script tag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub side_effects: bool,

    /// Module ids this module statically imports. Walked transitively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Module ids reachable only through deferred code paths. Walked
    /// one hop and demoted to prefetch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_imports: Vec<String>,

    /// True if the script must load as an ES module.
    #[serde(default, skip_serializing_if = "is_false")]
    pub module: bool,

    /// Per-resource prefetch override from upstream classification.
    /// `None` falls back to the type-based default (fonts excluded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<bool>,

    /// Per-resource preload override from upstream classification.
    /// `None` falls back to the type-based default (modules, scripts
    /// and styles included).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<bool>,

    /// Resource classification for `as=` attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,

    /// MIME type for `type=` attributes, known for fonts and images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceMeta {
    /// A minimal metadata record for a bare output path, classified by
    /// its extension.
    pub fn from_path(path: &str) -> Self {
        let parsed = parse_resource(path);
        Self {
            file: path.to_string(),
            module: parsed.is_module,
            resource_type: parsed.resource_type,
            mime_type: parsed.mime_type,
            ..Self::default()
        }
    }
}

/// The canonical manifest: module id to [`ResourceMeta`].
///
/// Backed by an `IndexMap` so iteration follows the manifest's own
/// order — the bundler's emission order, which is the order classic
/// deferred scripts must execute in (the webpack runtime chunk comes
/// before the app chunk). Deserialization preserves the source JSON's
/// key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub IndexMap<String, ResourceMeta>);

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Look up one module's metadata.
    pub fn get(&self, id: &str) -> Option<&ResourceMeta> {
        self.0.get(id)
    }

    /// Insert or replace one module's metadata.
    pub fn insert(&mut self, id: impl Into<String>, meta: ResourceMeta) -> Option<ResourceMeta> {
        self.0.insert(id.into(), meta)
    }

    /// True if the manifest contains the given module id.
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Iterate over `(id, meta)` pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResourceMeta)> {
        self.0.iter()
    }

    /// Number of modules in the manifest.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the manifest has no modules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Module ids flagged as page entry points, in manifest order.
    ///
    /// This order is load-bearing: entry scripts are emitted in it,
    /// and classic deferred scripts execute in document order.
    pub fn entrypoints(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, meta)| meta.is_entry)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Module ids flagged as dynamic entry points, in manifest order.
    pub fn dynamic_entrypoints(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, meta)| meta.is_dynamic_entry)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Parse a canonical manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<(String, ResourceMeta)> for Manifest {
    fn from_iter<T: IntoIterator<Item = (String, ResourceMeta)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a ResourceMeta);
    type IntoIter = indexmap::map::Iter<'a, String, ResourceMeta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
