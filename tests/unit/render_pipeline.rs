//! End-to-end render pipeline tests: raw manifest in, markup out.

use bundle_renderer::manifest::{
    WebpackManifest, normalize_vite_manifest, normalize_webpack_manifest,
};
use bundle_renderer::renderer::{
    get_resources, render_resource_headers, render_resource_hints, render_scripts, render_styles,
};
use bundle_renderer::{Manifest, RenderOptions, RendererContext, SsrContext};

fn manifest() -> Manifest {
    let raw = Manifest::from_json(
        r#"{
            "src/entry.ts": {
                "file": "entry.mjs",
                "isEntry": true,
                "imports": ["_vendor"],
                "css": ["entry.css"],
                "dynamicImports": ["src/about.ts"]
            },
            "_vendor": { "file": "vendor.mjs" },
            "src/about.ts": {
                "file": "about.mjs",
                "isDynamicEntry": true,
                "css": ["about.css"]
            }
        }"#,
    )
    .unwrap();
    normalize_vite_manifest(&raw)
}

fn context() -> RendererContext {
    RendererContext::new(RenderOptions::from_manifest(manifest())).unwrap()
}

#[test]
fn test_render_styles() {
    let context = context();
    let ssr = SsrContext::new();
    assert_eq!(
        render_styles(&ssr, &context),
        "<link rel=\"stylesheet\" href=\"/entry.css\">"
    );
}

#[test]
fn test_render_scripts() {
    let context = context();
    let ssr = SsrContext::new();
    assert_eq!(
        render_scripts(&ssr, &context),
        "<script type=\"module\" src=\"/entry.mjs\" crossorigin></script>"
    );
}

#[test]
fn test_render_resource_hints_preloads_before_prefetches() {
    let context = context();
    let ssr = SsrContext::new();
    assert_eq!(
        render_resource_hints(&ssr, &context),
        concat!(
            "<link rel=\"modulepreload\" as=\"script\" crossorigin href=\"/vendor.mjs\">",
            "<link rel=\"prefetch\" as=\"style\" crossorigin href=\"/about.css\">",
            "<link rel=\"prefetch\" as=\"script\" crossorigin href=\"/about.mjs\">",
        )
    );
}

#[test]
fn test_render_resource_headers() {
    let context = context();
    let ssr = SsrContext::new();
    let headers = render_resource_headers(&ssr, &context);
    assert_eq!(
        headers.get("link").map(String::as_str),
        Some(concat!(
            "</vendor.mjs>; rel=\"modulepreload\"; as=\"script\"; crossorigin, ",
            "</about.css>; rel=\"prefetch\"; as=\"style\"; crossorigin, ",
            "</about.mjs>; rel=\"prefetch\"; as=\"script\"; crossorigin",
        ))
    );
}

#[test]
fn test_registered_module_promotes_its_resources() {
    let context = context();
    let ssr = SsrContext::new();
    ssr.register_module("src/about.ts");

    // The dynamic page is now part of this request: its stylesheet is
    // delivered synchronously and its chunk becomes a preload, leaving
    // nothing worth prefetching. Entrypoint resources come first.
    assert_eq!(
        render_styles(&ssr, &context),
        concat!(
            "<link rel=\"stylesheet\" href=\"/entry.css\">",
            "<link rel=\"stylesheet\" href=\"/about.css\">",
        )
    );
    assert_eq!(
        render_resource_hints(&ssr, &context),
        concat!(
            "<link rel=\"modulepreload\" as=\"script\" crossorigin href=\"/vendor.mjs\">",
            "<link rel=\"modulepreload\" as=\"script\" crossorigin href=\"/about.mjs\">",
        )
    );
}

#[test]
fn test_request_dependencies_computed_once() {
    let context = context();
    let ssr = SsrContext::new();
    let before = render_scripts(&ssr, &context);

    // Registered too late: the request dependency set is already fixed.
    ssr.register_module("src/about.ts");
    assert_eq!(render_scripts(&ssr, &context), before);
}

#[test]
fn test_custom_build_assets_url() {
    let options = RenderOptions::from_manifest(manifest())
        .with_build_assets_url(|id| format!("https://cdn.example.com/{id}"));
    let context = RendererContext::new(options).unwrap();
    let ssr = SsrContext::new();
    assert_eq!(
        render_scripts(&ssr, &context),
        "<script type=\"module\" src=\"https://cdn.example.com/entry.mjs\" crossorigin></script>"
    );
}

#[test]
fn test_webpack_runtime_chunk_loads_before_app_chunk() {
    // Classic deferred scripts execute in document order, so the
    // runtime chunk has to be emitted ahead of the app chunk even
    // though it sorts after it.
    let legacy: WebpackManifest = serde_json::from_str(
        r#"{
            "all": ["runtime.js", "app.js"],
            "initial": ["runtime.js", "app.js"],
            "async": [],
            "modules": {}
        }"#,
    )
    .unwrap();
    let manifest = normalize_webpack_manifest(&legacy).unwrap();
    let context = RendererContext::new(RenderOptions::from_manifest(manifest)).unwrap();
    let ssr = SsrContext::new();
    assert_eq!(
        render_scripts(&ssr, &context),
        concat!(
            "<script src=\"/runtime.js\" defer crossorigin></script>",
            "<script src=\"/app.js\" defer crossorigin></script>",
        )
    );
}

#[test]
fn test_get_resources_shape() {
    let context = context();
    let ssr = SsrContext::new();
    let links = get_resources(&ssr, &context);
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].rel, "modulepreload");
    assert_eq!(links[1].rel, "prefetch");
    assert_eq!(links[2].rel, "prefetch");
}
