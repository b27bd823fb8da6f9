//! Unit test suite for bundle-renderer.
//!
//! Library-level tests exercising the public API without going through
//! the CLI:
//! - **render_pipeline**: manifest to rendered markup, end to end
//! - **equivalence**: live-manifest and precomputed substrates produce
//!   identical output
//! - **renderer_facade**: the async render facade and its error
//!   propagation
//!
//! ```bash
//! cargo test --test unit
//! ```

mod equivalence;
mod render_pipeline;
mod renderer_facade;
