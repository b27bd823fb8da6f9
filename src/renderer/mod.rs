//! Request-level rendering: projecting resolved dependencies into
//! markup fragments and wrapping the host application's render call.
//!
//! Everything here is a pure projection over [`ModuleDependencies`];
//! the only state is the per-request memo in [`SsrContext`] so that
//! repeated calls to the render accessors within one request do not
//! re-aggregate.
//!
//! # Facade
//!
//! [`Renderer`] is the per-process entry point the host application
//! holds: constructed once from a manifest or precomputed table plus
//! two async callbacks (create the app, render its body), it exposes
//! [`Renderer::render_to_string`] which returns the rendered HTML
//! alongside idempotent accessors for scripts, styles, resource hints
//! and `Link` headers. Errors from the callbacks propagate unchanged.

pub mod tags;

use futures::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::trace;

use crate::core::RendererError;
use crate::resolver::{ModuleDependencies, RenderOptions, RendererContext};

pub use tags::LinkAttributes;

/// Per-request state: the module ids touched while rendering one page,
/// plus a request-scoped cache of the aggregated dependencies.
///
/// Uses interior mutability so the host's render callback can register
/// modules while the context is shared with the renderer.
#[derive(Debug, Default)]
pub struct SsrContext {
    modules: Mutex<BTreeSet<String>>,
    request_dependencies: OnceLock<Arc<ModuleDependencies>>,
}

impl SsrContext {
    /// An empty request context (entry points only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A request context seeded with already-known module ids.
    pub fn with_modules(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            modules: Mutex::new(ids.into_iter().map(Into::into).collect()),
            request_dependencies: OnceLock::new(),
        }
    }

    /// Record that a module was used while rendering this request.
    ///
    /// Has no effect on the aggregated result once the render
    /// accessors have been called: the request dependency set is
    /// computed once per request.
    pub fn register_module(&self, id: impl Into<String>) {
        let mut modules = match self.modules.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        modules.insert(id.into());
    }

    /// Snapshot of the registered module ids.
    pub fn modules(&self) -> BTreeSet<String> {
        match self.modules.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Aggregate (once per request) the dependencies of the context's
/// entry points plus every module the request registered.
pub fn get_request_dependencies(
    ssr: &SsrContext,
    context: &RendererContext,
) -> Arc<ModuleDependencies> {
    ssr.request_dependencies
        .get_or_init(|| {
            let mut ids: BTreeSet<String> = context.entrypoints().into_iter().collect();
            ids.extend(ssr.modules());
            trace!(modules = ids.len(), "computing request dependencies");
            context.aggregate(&ids)
        })
        .clone()
}

/// Render the synchronous stylesheet links for one request.
pub fn render_styles(ssr: &SsrContext, context: &RendererContext) -> String {
    let deps = get_request_dependencies(ssr, context);
    styles_to_string(&deps, context)
}

/// Render the `<script>` tags for one request.
pub fn render_scripts(ssr: &SsrContext, context: &RendererContext) -> String {
    let deps = get_request_dependencies(ssr, context);
    scripts_to_string(&deps, context)
}

/// Preload and prefetch link attributes for one request, preloads
/// first.
pub fn get_resources(ssr: &SsrContext, context: &RendererContext) -> Vec<LinkAttributes> {
    let deps = get_request_dependencies(ssr, context);
    resources(&deps, context)
}

/// Render the combined preload + prefetch hints for one request.
pub fn render_resource_hints(ssr: &SsrContext, context: &RendererContext) -> String {
    let deps = get_request_dependencies(ssr, context);
    resource_hints_to_string(&deps, context)
}

/// Render the HTTP `Link` header for one request.
pub fn render_resource_headers(
    ssr: &SsrContext,
    context: &RendererContext,
) -> BTreeMap<String, String> {
    let deps = get_request_dependencies(ssr, context);
    resource_headers(&deps, context)
}

fn styles_to_string(deps: &ModuleDependencies, context: &RendererContext) -> String {
    deps.styles
        .values()
        .map(|resource| tags::stylesheet_link(context.build_assets_url(&resource.file)).to_html())
        .collect()
}

fn scripts_to_string(deps: &ModuleDependencies, context: &RendererContext) -> String {
    deps.scripts
        .values()
        .map(|resource| tags::script_tag(resource, &context.build_assets_url(&resource.file)))
        .collect()
}

fn preload_links(deps: &ModuleDependencies, context: &RendererContext) -> Vec<LinkAttributes> {
    deps.preload
        .values()
        .map(|resource| tags::preload_link(resource, context.build_assets_url(&resource.file)))
        .collect()
}

fn prefetch_links(deps: &ModuleDependencies, context: &RendererContext) -> Vec<LinkAttributes> {
    deps.prefetch
        .values()
        .map(|resource| tags::prefetch_link(resource, context.build_assets_url(&resource.file)))
        .collect()
}

fn resources(deps: &ModuleDependencies, context: &RendererContext) -> Vec<LinkAttributes> {
    let mut links = preload_links(deps, context);
    links.extend(prefetch_links(deps, context));
    links
}

fn resource_hints_to_string(deps: &ModuleDependencies, context: &RendererContext) -> String {
    resources(deps, context).iter().map(LinkAttributes::to_html).collect()
}

fn resource_headers(
    deps: &ModuleDependencies,
    context: &RendererContext,
) -> BTreeMap<String, String> {
    let link = resources(deps, context)
        .iter()
        .map(LinkAttributes::to_header)
        .collect::<Vec<_>>()
        .join(", ");
    BTreeMap::from([("link".to_string(), link)])
}

type CreateApp<App> =
    Box<dyn Fn(Arc<SsrContext>) -> BoxFuture<'static, anyhow::Result<App>> + Send + Sync>;
type RenderBody<App> =
    Box<dyn Fn(App, Arc<SsrContext>) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// The result of one server-side render: the page body plus
/// synchronous, idempotent accessors over the request's resolved
/// dependency set.
pub struct RenderResult {
    /// The rendered page body.
    pub html: String,
    dependencies: Arc<ModuleDependencies>,
    context: Arc<RendererContext>,
}

impl RenderResult {
    /// The `<script>` tags this page needs to execute.
    pub fn render_scripts(&self) -> String {
        scripts_to_string(&self.dependencies, &self.context)
    }

    /// The synchronous stylesheet links this page needs.
    pub fn render_styles(&self) -> String {
        styles_to_string(&self.dependencies, &self.context)
    }

    /// The combined preload + prefetch `<link>` hints.
    pub fn render_resource_hints(&self) -> String {
        resource_hints_to_string(&self.dependencies, &self.context)
    }

    /// The HTTP `Link` header for the hinted resources.
    pub fn render_resource_headers(&self) -> BTreeMap<String, String> {
        resource_headers(&self.dependencies, &self.context)
    }

    /// The underlying resolved dependency set.
    pub fn dependencies(&self) -> &ModuleDependencies {
        &self.dependencies
    }
}

// Manual impl: the held context carries trait-object policy hooks.
impl fmt::Debug for RenderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderResult")
            .field("html", &self.html)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Per-process render facade wrapping the host application's app
/// creation and body rendering callbacks.
pub struct Renderer<App> {
    context: Arc<RendererContext>,
    create_app: CreateApp<App>,
    render_body: RenderBody<App>,
}

impl<App> Renderer<App> {
    /// Construct a renderer from options plus the two host callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::MissingManifest`] when the options
    /// carry neither a manifest nor a precomputed table.
    pub fn new<C, CFut, R, RFut>(
        create_app: C,
        render_body: R,
        options: RenderOptions,
    ) -> Result<Self, RendererError>
    where
        C: Fn(Arc<SsrContext>) -> CFut + Send + Sync + 'static,
        CFut: Future<Output = anyhow::Result<App>> + Send + 'static,
        R: Fn(App, Arc<SsrContext>) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        Ok(Self {
            context: Arc::new(RendererContext::new(options)?),
            create_app: Box::new(move |ssr| Box::pin(create_app(ssr))),
            render_body: Box::new(move |app, ssr| Box::pin(render_body(app, ssr))),
        })
    }

    /// The owned renderer context, for hot-swapping manifests or
    /// direct resolution.
    pub fn context(&self) -> &Arc<RendererContext> {
        &self.context
    }

    /// Render one request: create the app, render its body, and
    /// attach the dependency accessors.
    ///
    /// Callback failures propagate unchanged; this layer adds no
    /// wrapping of its own.
    pub async fn render_to_string(&self, ssr: Arc<SsrContext>) -> anyhow::Result<RenderResult> {
        let app = (self.create_app)(ssr.clone()).await?;
        let html = (self.render_body)(app, ssr.clone()).await?;
        let dependencies = get_request_dependencies(&ssr, &self.context);
        Ok(RenderResult {
            html,
            dependencies,
            context: self.context.clone(),
        })
    }
}
