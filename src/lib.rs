//! bundle-renderer — SSR dependency resolution for bundler manifests.
//!
//! Turns a static build-time asset manifest into the minimal,
//! correctly-ordered set of HTML resource references (`<script>`,
//! `<link rel=stylesheet>`, `<link rel=preload/prefetch/modulepreload>`)
//! needed to render a given page during server-side rendering. For any
//! set of modules used by one request, it answers: which files must
//! load synchronously, which styles go out as stylesheet links, which
//! assets should be hinted ahead of need, and which belong to code
//! paths that might load later.
//!
//! # Architecture Overview
//!
//! Data flows leaf to root:
//!
//! 1. A bundler manifest (Vite, canonical, or legacy webpack) is
//!    normalized once into the canonical resource-metadata map.
//! 2. The resolver walks one module's static import graph transitively
//!    and classifies every reachable resource by delivery strategy,
//!    memoized per module id.
//! 3. The aggregator unions the resolutions for the set of modules one
//!    request touched, folds in one hop of dynamic-import prefetch
//!    candidates, and applies the demotion rules (styles beat preload,
//!    preload beats prefetch), memoized per distinct id set.
//! 4. The tag renderer projects the result into HTML fragments and
//!    `Link` header values.
//!
//! Resolution is a pure function of the manifest, so it can also run
//! ahead of time: the [`precompute`] pass flattens an entire manifest
//! into a serializable table a server loads instead of the manifest,
//! with identical aggregation output.
//!
//! # Core Modules
//!
//! - [`manifest`] - Resource metadata model, classification, and
//!   bundler-native format normalization
//! - [`resolver`] - Transitive dependency resolution and per-request
//!   aggregation with append-only caching
//! - [`precompute`] - Build-time flattening of a whole manifest
//! - [`renderer`] - Tag/header rendering and the async render facade
//! - [`core`] - Crate error types
//! - [`cli`] - The companion binary's subcommands
//!
//! # Example
//!
//! ```rust
//! use bundle_renderer::manifest::{Manifest, normalize_vite_manifest};
//! use bundle_renderer::resolver::{RenderOptions, RendererContext};
//! use bundle_renderer::renderer::{SsrContext, render_scripts, render_styles};
//!
//! # fn main() -> anyhow::Result<()> {
//! let manifest: Manifest = serde_json::from_str(
//!     r#"{
//!         "entry.mjs": { "file": "entry.mjs", "isEntry": true, "css": ["entry.css"] },
//!         "entry.css": { "file": "entry.css" }
//!     }"#,
//! )?;
//! let context = RendererContext::new(RenderOptions::from_manifest(
//!     normalize_vite_manifest(&manifest),
//! ))?;
//!
//! let ssr = SsrContext::new();
//! assert_eq!(
//!     render_scripts(&ssr, &context),
//!     "<script type=\"module\" src=\"/entry.mjs\" crossorigin></script>"
//! );
//! assert_eq!(
//!     render_styles(&ssr, &context),
//!     "<link rel=\"stylesheet\" href=\"/entry.css\">"
//! );
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod manifest;
pub mod precompute;
pub mod renderer;
pub mod resolver;

pub use crate::core::RendererError;
pub use manifest::{Manifest, ResourceMeta, ResourceType};
pub use precompute::{PrecomputedData, precompute};
pub use renderer::{RenderResult, Renderer, SsrContext};
pub use resolver::{ModuleDependencies, RenderOptions, RendererContext};
