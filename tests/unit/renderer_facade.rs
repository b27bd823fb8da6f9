//! Tests for the async render facade.

use std::sync::Arc;

use bundle_renderer::manifest::normalize_vite_manifest;
use bundle_renderer::{
    Manifest, RenderOptions, Renderer, RendererError, SsrContext,
};

fn manifest() -> Manifest {
    let raw = Manifest::from_json(
        r#"{
            "src/entry.ts": {
                "file": "entry.mjs",
                "isEntry": true,
                "css": ["entry.css"],
                "dynamicImports": ["src/about.ts"]
            },
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

struct App {
    title: String,
}

fn renderer() -> Renderer<App> {
    Renderer::new(
        |_ssr| async {
            Ok(App {
                title: "hello".to_string(),
            })
        },
        |app: App, ssr| async move {
            ssr.register_module("src/about.ts");
            Ok(format!("<div>{}</div>", app.title))
        },
        RenderOptions::from_manifest(manifest()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_render_to_string() {
    let renderer = renderer();
    let result = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap();

    assert_eq!(result.html, "<div>hello</div>");
    // Modules registered during body rendering are reflected in the
    // attached dependency set.
    assert!(result.dependencies().styles.contains_key("about.css"));
    assert!(result.dependencies().styles.contains_key("entry.css"));
}

#[tokio::test]
async fn test_result_accessors_are_idempotent() {
    let renderer = renderer();
    let result = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap();

    let scripts = result.render_scripts();
    assert_eq!(
        scripts,
        "<script type=\"module\" src=\"/entry.mjs\" crossorigin></script>"
    );
    assert_eq!(result.render_scripts(), scripts);
    assert_eq!(result.render_styles(), result.render_styles());
    assert_eq!(result.render_resource_hints(), result.render_resource_hints());
    assert_eq!(
        result.render_resource_headers(),
        result.render_resource_headers()
    );
}

#[tokio::test]
async fn test_result_is_debuggable() {
    let renderer = renderer();
    let result = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap();
    let rendered = format!("{result:?}");
    assert!(rendered.contains("RenderResult"));
    assert!(rendered.contains("<div>hello</div>"));
}

#[tokio::test]
async fn test_create_app_error_propagates() {
    let renderer: Renderer<App> = Renderer::new(
        |_ssr| async { Err(anyhow::anyhow!("app construction failed")) },
        |app: App, _ssr| async move { Ok(app.title) },
        RenderOptions::from_manifest(manifest()),
    )
    .unwrap();

    let err = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "app construction failed");
}

#[tokio::test]
async fn test_render_body_error_propagates() {
    let renderer: Renderer<App> = Renderer::new(
        |_ssr| async {
            Ok(App {
                title: "hello".to_string(),
            })
        },
        |_app, _ssr| async { Err(anyhow::anyhow!("body render failed")) },
        RenderOptions::from_manifest(manifest()),
    )
    .unwrap();

    let err = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "body render failed");
}

#[test]
fn test_renderer_requires_a_substrate() {
    let result: Result<Renderer<()>, _> = Renderer::new(
        |_ssr| async { Ok(()) },
        |_app: (), _ssr| async { Ok(String::new()) },
        RenderOptions::default(),
    );
    match result {
        Ok(_) => panic!("construction should fail without a substrate"),
        Err(err) => assert!(matches!(err, RendererError::MissingManifest)),
    }
}

#[tokio::test]
async fn test_hot_swap_through_facade() {
    let renderer = renderer();
    let updated = normalize_vite_manifest(
        &Manifest::from_json(
            r#"{ "src/entry.ts": { "file": "entry-v2.mjs", "isEntry": true } }"#,
        )
        .unwrap(),
    );
    renderer.context().update_manifest(updated);

    let result = renderer
        .render_to_string(Arc::new(SsrContext::new()))
        .await
        .unwrap();
    assert_eq!(
        result.render_scripts(),
        "<script type=\"module\" src=\"/entry-v2.mjs\" crossorigin></script>"
    );
}
