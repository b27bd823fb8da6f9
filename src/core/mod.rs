//! Core types and error handling for bundle-renderer.
//!
//! This module hosts the crate-wide error enum shared by manifest
//! ingestion, the precompute pass, and renderer construction.

pub mod error;

pub use error::RendererError;
