//! Integration test suite for bundle-renderer.
//!
//! End-to-end tests that drive the compiled binary against real
//! manifest files:
//! - **cli_precompute**: the `precompute` subcommand
//! - **cli_inspect**: the `inspect` subcommand
//!
//! ```bash
//! cargo test --test integration
//! ```

mod cli_precompute;

use std::path::PathBuf;

/// Path to a file under `tests/fixtures/`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
