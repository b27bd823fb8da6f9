//! Dependency resolution and request aggregation.
//!
//! This is the core of the crate: given a manifest, compute for any
//! module id the complete, flattened set of resources a page needs —
//! split by delivery strategy — and for any *set* of ids (one SSR
//! request) the merged, deduplicated union.
//!
//! # Delivery strategies
//!
//! [`ModuleDependencies`] carries four maps keyed by module id:
//!
//! - `scripts` — must be emitted as `<script>` tags for the page to
//!   execute. Only entry and side-effect modules land here; nested
//!   static imports ride along as preload hints because the module
//!   system, not the page shell, fetches them at runtime.
//! - `styles` — synchronous `<link rel=stylesheet>` tags.
//! - `preload` — strong hints for resources needed imminently.
//! - `prefetch` — weak hints for resources a later navigation or a
//!   dynamic import might need.
//!
//! Within one value an id never appears in both `styles` and `preload`,
//! nor in both `preload` and `prefetch`: style delivery supersedes
//! hinting, and preload supersedes prefetch. The precedence is applied
//! after all merging so nested contributions obey the same policy.
//!
//! # Caching
//!
//! A [`RendererContext`] owns two append-only caches: per-module
//! resolutions and per-id-set aggregations (keyed by the sorted,
//! comma-joined set). Both are [`DashMap`]s so any number of in-flight
//! requests can share a context without extra synchronization; a
//! manifest hot-swap replaces the whole state behind an `Arc` in a
//! single assignment, so concurrent readers never observe a
//! half-cleared cache.
//!
//! # Substrates
//!
//! The context resolves against either a live [`Manifest`] or a
//! [`PrecomputedData`] table produced ahead of time by
//! [`crate::precompute`]; aggregation output is identical either way.


use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

use crate::core::RendererError;
use crate::manifest::{Manifest, ResourceMeta, ResourceType};
use crate::precompute::PrecomputedData;

/// A caller-overridable predicate over resource metadata, consulted
/// once per candidate during resolution or aggregation.
pub type ResourcePredicate = Arc<dyn Fn(&ResourceMeta) -> bool + Send + Sync>;

/// Rewrites a manifest output path into the URL emitted in tags.
pub type AssetUrlBuilder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Default preload policy: the per-resource override flag wins if set,
/// otherwise modules, scripts and styles qualify.
pub fn default_should_preload(resource: &ResourceMeta) -> bool {
    resource.preload.unwrap_or_else(|| {
        resource.module
            || matches!(
                resource.resource_type,
                Some(ResourceType::Script | ResourceType::Style)
            )
    })
}

/// Default prefetch policy: the per-resource override flag wins if
/// set, otherwise everything but fonts qualifies. Prefetching a font
/// with no confirmed style match wastes a request.
pub fn default_should_prefetch(resource: &ResourceMeta) -> bool {
    resource
        .prefetch
        .unwrap_or(resource.resource_type != Some(ResourceType::Font))
}

/// Default URL rewriting: prefix a leading slash.
pub fn default_build_assets_url(id: &str) -> String {
    if id.starts_with('/') {
        id.to_string()
    } else {
        format!("/{id}")
    }
}

/// A module's (or a request's) resolved dependency set, split by
/// delivery strategy.
///
/// Backed by `IndexMap`s so iteration follows discovery order, which
/// for `scripts` is the entrypoint order classic deferred scripts must
/// execute in (the webpack runtime chunk comes before the app chunk).
/// Output is still a pure function of the manifest and the unordered
/// request id set: aggregation merges in a canonical order (see
/// [`RendererContext::aggregate`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDependencies {
    /// Ids emitted as `<script>` tags, in entrypoint order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, ResourceMeta>,
    /// Ids emitted as synchronous stylesheet links.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, ResourceMeta>,
    /// Ids hinted as needed imminently.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub preload: IndexMap<String, ResourceMeta>,
    /// Ids hinted as possibly needed later.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prefetch: IndexMap<String, ResourceMeta>,
}

impl ModuleDependencies {
    /// True if all four sets are empty.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
            && self.styles.is_empty()
            && self.preload.is_empty()
            && self.prefetch.is_empty()
    }
}

fn remove_keys_in(
    map: &mut IndexMap<String, ResourceMeta>,
    other: &IndexMap<String, ResourceMeta>,
) {
    map.retain(|key, _| !other.contains_key(key));
}

/// Options for constructing a [`RendererContext`].
///
/// Exactly one of `manifest` or `precomputed` must be supplied;
/// providing neither is the one fatal configuration error. Policy
/// hooks fall back to the defaults above when unset.
#[derive(Default)]
pub struct RenderOptions {
    /// Live manifest to resolve against.
    pub manifest: Option<Manifest>,
    /// Precomputed dependency table to resolve against.
    pub precomputed: Option<PrecomputedData>,
    /// Preload policy override.
    pub should_preload: Option<ResourcePredicate>,
    /// Prefetch policy override.
    pub should_prefetch: Option<ResourcePredicate>,
    /// URL rewriting override.
    pub build_assets_url: Option<AssetUrlBuilder>,
}

impl RenderOptions {
    /// Options over a live manifest.
    #[must_use]
    pub fn from_manifest(manifest: Manifest) -> Self {
        Self {
            manifest: Some(manifest),
            ..Self::default()
        }
    }

    /// Options over a precomputed dependency table.
    #[must_use]
    pub fn from_precomputed(precomputed: PrecomputedData) -> Self {
        Self {
            precomputed: Some(precomputed),
            ..Self::default()
        }
    }

    /// Override the preload policy.
    #[must_use]
    pub fn with_should_preload(
        mut self,
        predicate: impl Fn(&ResourceMeta) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_preload = Some(Arc::new(predicate));
        self
    }

    /// Override the prefetch policy.
    #[must_use]
    pub fn with_should_prefetch(
        mut self,
        predicate: impl Fn(&ResourceMeta) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_prefetch = Some(Arc::new(predicate));
        self
    }

    /// Override URL rewriting for emitted paths.
    #[must_use]
    pub fn with_build_assets_url(
        mut self,
        build: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.build_assets_url = Some(Arc::new(build));
        self
    }
}

/// What the context resolves against.
enum Substrate {
    /// A live manifest, walked recursively with memoization.
    Live(Manifest),
    /// A flattened table computed ahead of time.
    Precomputed(PrecomputedData),
}

impl Substrate {
    fn entrypoints(&self) -> Vec<String> {
        match self {
            Self::Live(manifest) => manifest.entrypoints(),
            Self::Precomputed(data) => data.entrypoints.clone(),
        }
    }

    fn dynamic_imports(&self, id: &str) -> &[String] {
        match self {
            Self::Live(manifest) => manifest
                .get(id)
                .map(|meta| meta.dynamic_imports.as_slice())
                .unwrap_or(&[]),
            Self::Precomputed(data) => data
                .modules
                .get(id)
                .map(|meta| meta.dynamic_imports.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// Swappable per-manifest state: the substrate, its entrypoints, and
/// the two append-only caches. Replaced wholesale on hot swap.
struct ContextState {
    substrate: Substrate,
    entrypoints: Vec<String>,
    dependencies: DashMap<String, Arc<ModuleDependencies>>,
    dependency_sets: DashMap<String, Arc<ModuleDependencies>>,
}

impl ContextState {
    fn new(substrate: Substrate) -> Self {
        Self {
            entrypoints: substrate.entrypoints(),
            substrate,
            dependencies: DashMap::new(),
            dependency_sets: DashMap::new(),
        }
    }
}

/// Process-wide, per-manifest resolution context.
///
/// Created once when the manifest (or precomputed table) becomes
/// available and shared across requests for the process lifetime, or
/// until hot-swapped via [`RendererContext::update_manifest`].
pub struct RendererContext {
    should_preload: ResourcePredicate,
    should_prefetch: ResourcePredicate,
    build_assets_url: AssetUrlBuilder,
    state: RwLock<Arc<ContextState>>,
}

impl RendererContext {
    /// Construct a context from options.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::MissingManifest`] when neither a
    /// manifest nor a precomputed table is provided. This surfaces at
    /// construction so misconfiguration never fails mid-request.
    pub fn new(options: RenderOptions) -> Result<Self, RendererError> {
        let substrate = match (options.manifest, options.precomputed) {
            (_, Some(precomputed)) => Substrate::Precomputed(precomputed),
            (Some(manifest), None) => Substrate::Live(manifest),
            (None, None) => return Err(RendererError::MissingManifest),
        };
        Ok(Self {
            should_preload: options
                .should_preload
                .unwrap_or_else(|| Arc::new(default_should_preload)),
            should_prefetch: options
                .should_prefetch
                .unwrap_or_else(|| Arc::new(default_should_prefetch)),
            build_assets_url: options
                .build_assets_url
                .unwrap_or_else(|| Arc::new(default_build_assets_url)),
            state: RwLock::new(Arc::new(ContextState::new(substrate))),
        })
    }

    /// The URL rewriting hook applied to every emitted path.
    pub fn build_assets_url(&self, id: &str) -> String {
        (self.build_assets_url)(id)
    }

    /// Entry-point module ids of the current substrate.
    pub fn entrypoints(&self) -> Vec<String> {
        self.state().entrypoints.clone()
    }

    /// Hot-swap the live manifest.
    ///
    /// Builds a fresh state (empty caches included) and replaces the
    /// current one in a single assignment, so requests already holding
    /// the old state finish against it consistently.
    pub fn update_manifest(&self, manifest: Manifest) {
        self.swap_state(ContextState::new(Substrate::Live(manifest)));
    }

    /// Hot-swap to a precomputed dependency table.
    pub fn update_precomputed(&self, precomputed: PrecomputedData) {
        self.swap_state(ContextState::new(Substrate::Precomputed(precomputed)));
    }

    fn swap_state(&self, state: ContextState) {
        debug!(entrypoints = state.entrypoints.len(), "replacing renderer context state");
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(state);
    }

    fn state(&self) -> Arc<ContextState> {
        let guard = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    /// Resolve one module's complete, flattened dependency set.
    ///
    /// Memoized per module id for the life of the current state. A
    /// dangling id resolves to the empty set; a cyclic import chain
    /// terminates with a partial result for the cyclic edge.
    pub fn resolve(&self, id: &str) -> Arc<ModuleDependencies> {
        let state = self.state();
        self.resolve_in(&state, id)
    }

    fn resolve_in(&self, state: &ContextState, id: &str) -> Arc<ModuleDependencies> {
        if let Some(hit) = state.dependencies.get(id) {
            trace!(module = id, "module dependency cache hit");
            return hit.clone();
        }

        match &state.substrate {
            Substrate::Precomputed(data) => {
                let deps =
                    Arc::new(data.dependencies.get(id).cloned().unwrap_or_default());
                state.dependencies.insert(id.to_string(), deps.clone());
                deps
            }
            Substrate::Live(manifest) => {
                trace!(module = id, "resolving module dependencies");
                let mut table = BTreeMap::new();
                let mut in_progress = HashSet::new();
                resolve_module(
                    manifest,
                    id,
                    &mut table,
                    &mut in_progress,
                    self.should_preload.as_ref(),
                );

                // Persist everything this walk settled, then hand back
                // the requested entry. Losing a concurrent insert race
                // is fine: both walks computed the same value.
                let mut resolved = None;
                for (key, deps) in table {
                    let entry = state
                        .dependencies
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(deps))
                        .clone();
                    if key == id {
                        resolved = Some(entry);
                    }
                }
                resolved.unwrap_or_default()
            }
        }
    }

    /// Aggregate the dependencies of every id used by one request,
    /// plus one extra hop through each id's dynamic imports demoted to
    /// prefetch.
    ///
    /// Memoized per distinct id set; the cache key is the sorted,
    /// comma-joined set, so two requests touching the same modules in
    /// different discovery order share an entry.
    ///
    /// Merging follows a canonical order — the context's entrypoints
    /// in their manifest order, then the remaining ids sorted — so the
    /// result is a pure function of the unordered set while `scripts`
    /// still come out in entrypoint order.
    pub fn aggregate(&self, ids: &BTreeSet<String>) -> Arc<ModuleDependencies> {
        let state = self.state();
        let cache_key = ids.iter().cloned().collect::<Vec<_>>().join(",");
        if let Some(hit) = state.dependency_sets.get(&cache_key) {
            trace!(key = %cache_key, "dependency set cache hit");
            return hit.clone();
        }
        debug!(modules = ids.len(), "aggregating request dependencies");

        let mut ordered: Vec<&String> = state
            .entrypoints
            .iter()
            .filter(|id| ids.contains(*id))
            .collect();
        ordered.extend(ids.iter().filter(|id| !state.entrypoints.contains(*id)));

        let mut all = ModuleDependencies::default();
        for id in ordered {
            let deps = self.resolve_in(&state, id);
            all.scripts.extend(deps.scripts.clone());
            all.styles.extend(deps.styles.clone());
            all.preload.extend(deps.preload.clone());
            all.prefetch.extend(deps.prefetch.clone());

            // One hop through dynamic imports: anything reachable only
            // via a deferred code path is never eagerly preloaded, only
            // hinted as a future possibility.
            for dynamic_id in state.substrate.dynamic_imports(id) {
                let dynamic_deps = self.resolve_in(&state, dynamic_id);
                all.prefetch.extend(dynamic_deps.scripts.clone());
                all.prefetch.extend(dynamic_deps.styles.clone());
                all.prefetch.extend(dynamic_deps.preload.clone());
            }
        }

        all.prefetch.retain(|_, resource| (self.should_prefetch)(resource));

        // Fixed demotion order: preload beats prefetch, synchronous
        // delivery (scripts and styles) beats both. A resource already
        // emitted as a tag makes any hint for the same id redundant.
        remove_keys_in(&mut all.prefetch, &all.preload);
        remove_keys_in(&mut all.preload, &all.styles);
        remove_keys_in(&mut all.prefetch, &all.styles);
        remove_keys_in(&mut all.preload, &all.scripts);
        remove_keys_in(&mut all.prefetch, &all.scripts);

        let all = Arc::new(all);
        state.dependency_sets.insert(cache_key, all.clone());
        all
    }
}

// Manual impl: the policy hooks are trait objects.
impl fmt::Debug for RendererContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererContext")
            .field("entrypoints", &self.state().entrypoints)
            .finish_non_exhaustive()
    }
}

/// Recursive walk over one module's static import graph.
///
/// `table` memoizes finished modules for the current walk (and, in the
/// precompute pass, for the whole manifest); `in_progress` breaks
/// cycles. A module encountered while already being computed
/// contributes an empty partial result, which terminates the walk
/// without failing the render.
pub(crate) fn resolve_module(
    manifest: &Manifest,
    id: &str,
    table: &mut BTreeMap<String, ModuleDependencies>,
    in_progress: &mut HashSet<String>,
    should_preload: &(dyn Fn(&ResourceMeta) -> bool + Send + Sync),
) -> ModuleDependencies {
    if let Some(done) = table.get(id) {
        return done.clone();
    }
    if in_progress.contains(id) {
        trace!(module = id, "import cycle detected, breaking");
        return ModuleDependencies::default();
    }

    let mut deps = ModuleDependencies::default();
    let Some(meta) = manifest.get(id) else {
        // Dangling reference: manifests may legitimately point at
        // modules this resolver does not model.
        table.insert(id.to_string(), deps.clone());
        return deps;
    };
    in_progress.insert(id.to_string());

    // A module with no output file exists purely to be imported,
    // contributing style/asset dependents without being executable.
    if !meta.file.is_empty() {
        deps.preload.insert(id.to_string(), meta.clone());
        if meta.is_entry || meta.side_effects {
            deps.scripts.insert(id.to_string(), meta.clone());
        }
    }

    for css in &meta.css {
        if let Some(css_meta) = manifest.get(css) {
            deps.styles.insert(css.clone(), css_meta.clone());
            deps.preload.insert(css.clone(), css_meta.clone());
            deps.prefetch.insert(css.clone(), css_meta.clone());
        }
    }

    for asset in &meta.assets {
        if let Some(asset_meta) = manifest.get(asset) {
            deps.preload.insert(asset.clone(), asset_meta.clone());
            deps.prefetch.insert(asset.clone(), asset_meta.clone());
        }
    }

    // Static imports only: dynamic imports are the aggregator's
    // concern. Scripts are not propagated upward — the module system
    // fetches nested imports itself, so they ride along as preloads.
    for dep_id in &meta.imports {
        let dep_deps = resolve_module(manifest, dep_id, table, in_progress, should_preload);
        deps.styles.extend(dep_deps.styles);
        deps.preload.extend(dep_deps.preload);
        deps.prefetch.extend(dep_deps.prefetch);
    }

    // Policy filter runs after all merging so nested contributions are
    // subject to the same rules as top-level ones.
    deps.preload.retain(|_, resource| should_preload(resource));
    remove_keys_in(&mut deps.preload, &deps.styles);
    remove_keys_in(&mut deps.prefetch, &deps.preload);

    in_progress.remove(id);
    table.insert(id.to_string(), deps.clone());
    deps
}
