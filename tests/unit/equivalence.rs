//! Live-manifest vs precomputed substrate equivalence.
//!
//! A context constructed from a precomputed bundle must produce output
//! identical to one constructed from the manifest the bundle was
//! computed from. This is a contract of the precompute pass, not an
//! optimization detail.

use std::collections::BTreeSet;
use std::path::Path;

use bundle_renderer::renderer::{
    render_resource_headers, render_resource_hints, render_scripts, render_styles,
};
use bundle_renderer::{Manifest, RenderOptions, RendererContext, SsrContext, precompute};

fn fixture_manifest() -> Manifest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vite-manifest.json");
    Manifest::load(&path).unwrap()
}

fn contexts() -> (RendererContext, RendererContext) {
    let manifest = fixture_manifest();
    let data = precompute(&manifest);
    let live = RendererContext::new(RenderOptions::from_manifest(manifest)).unwrap();
    let precomputed = RendererContext::new(RenderOptions::from_precomputed(data)).unwrap();
    (live, precomputed)
}

#[test]
fn test_entrypoints_match() {
    let (live, precomputed) = contexts();
    assert_eq!(live.entrypoints(), precomputed.entrypoints());
}

#[test]
fn test_resolution_matches_for_every_module() {
    let manifest = fixture_manifest();
    let data = precompute(&manifest);
    let ids: Vec<String> = manifest.iter().map(|(id, _)| id.clone()).collect();

    let live = RendererContext::new(RenderOptions::from_manifest(manifest)).unwrap();
    let precomputed = RendererContext::new(RenderOptions::from_precomputed(data)).unwrap();

    for id in &ids {
        assert_eq!(
            *live.resolve(id),
            *precomputed.resolve(id),
            "resolution differs for {id}"
        );
    }
}

#[test]
fn test_aggregation_matches() {
    let (live, precomputed) = contexts();
    let ids: BTreeSet<String> = live.entrypoints().into_iter().collect();
    assert_eq!(*live.aggregate(&ids), *precomputed.aggregate(&ids));

    let mut with_page = ids;
    with_page.insert("src/pages/about.ts".to_string());
    assert_eq!(*live.aggregate(&with_page), *precomputed.aggregate(&with_page));
}

#[test]
fn test_rendered_output_matches() {
    let (live, precomputed) = contexts();

    let live_ssr = SsrContext::with_modules(["src/pages/about.ts"]);
    let precomputed_ssr = SsrContext::with_modules(["src/pages/about.ts"]);

    assert_eq!(
        render_styles(&live_ssr, &live),
        render_styles(&precomputed_ssr, &precomputed)
    );
    assert_eq!(
        render_scripts(&live_ssr, &live),
        render_scripts(&precomputed_ssr, &precomputed)
    );
    assert_eq!(
        render_resource_hints(&live_ssr, &live),
        render_resource_hints(&precomputed_ssr, &precomputed)
    );
    assert_eq!(
        render_resource_headers(&live_ssr, &live),
        render_resource_headers(&precomputed_ssr, &precomputed)
    );
}

#[test]
fn test_dangling_id_matches() {
    let (live, precomputed) = contexts();
    assert_eq!(*live.resolve("ghost"), *precomputed.resolve("ghost"));
    assert!(live.resolve("ghost").is_empty());
}

#[test]
fn test_serialized_bundle_round_trips_through_context() {
    let manifest = fixture_manifest();
    let data = precompute(&manifest);
    let json = serde_json::to_string(&data).unwrap();
    let reloaded = serde_json::from_str(&json).unwrap();

    let live = RendererContext::new(RenderOptions::from_manifest(manifest)).unwrap();
    let precomputed = RendererContext::new(RenderOptions::from_precomputed(reloaded)).unwrap();
    let ids: BTreeSet<String> = live.entrypoints().into_iter().collect();
    assert_eq!(*live.aggregate(&ids), *precomputed.aggregate(&ids));
}
