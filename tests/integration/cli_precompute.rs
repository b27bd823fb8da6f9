//! Integration tests for `bundle-renderer precompute`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use bundle_renderer::PrecomputedData;

use super::fixture;

#[test]
fn test_precompute_vite_manifest() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("precomputed.json");

    Command::cargo_bin("bundle-renderer")
        .unwrap()
        .arg("precompute")
        .arg(fixture("vite-manifest.json"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Precomputed"))
        .stdout(predicate::str::contains("1 entrypoints"));

    let data = PrecomputedData::load(&output).unwrap();
    assert_eq!(data.entrypoints, vec!["src/entry.ts".to_string()]);
    assert!(data.dependencies.contains_key("src/entry.ts"));
    // Synthesized css/asset entries are resolved too.
    assert!(data.dependencies.contains_key("assets/entry.Ck8pQa2d.css"));
    assert_eq!(
        data.modules["src/entry.ts"].dynamic_imports,
        vec!["src/pages/about.ts".to_string()]
    );
}

#[test]
fn test_precompute_legacy_webpack_manifest() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("precomputed.json");

    Command::cargo_bin("bundle-renderer")
        .unwrap()
        .arg("precompute")
        .arg(fixture("webpack-manifest.json"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let data = PrecomputedData::load(&output).unwrap();
    assert!(data.entrypoints.contains(&"_runtime.js".to_string()));
    assert!(data.entrypoints.contains(&"_app.js".to_string()));
    assert!(data.dependencies.contains_key("src/pages/index.vue"));
}

#[test]
fn test_precompute_missing_manifest_fails() {
    Command::cargo_bin("bundle-renderer")
        .unwrap()
        .arg("precompute")
        .arg("does-not-exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("failed to read manifest"));
}

#[test]
fn test_precompute_invalid_manifest_fails() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("bad.json");
    std::fs::write(&manifest, "not json").unwrap();

    Command::cargo_bin("bundle-renderer")
        .unwrap()
        .arg("precompute")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse manifest"));
}
