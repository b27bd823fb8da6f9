//! The `precompute` subcommand.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::manifest::Manifest;
use crate::precompute::precompute;

/// Arguments for `bundle-renderer precompute`.
#[derive(Args)]
pub struct PrecomputeCommand {
    /// Path to the manifest JSON file.
    pub manifest: PathBuf,

    /// Output path for the precomputed bundle.
    #[arg(short, long, default_value = "precomputed.json")]
    pub output: PathBuf,
}

impl PrecomputeCommand {
    /// Load, normalize, precompute, and write the bundle.
    pub fn execute(self) -> Result<()> {
        let manifest = Manifest::load(&self.manifest)?;
        let data = precompute(&manifest);
        data.save(&self.output)?;
        info!(
            modules = data.dependencies.len(),
            entrypoints = data.entrypoints.len(),
            output = %self.output.display(),
            "wrote precomputed dependency table"
        );
        println!(
            "Precomputed {} modules ({} entrypoints) -> {}",
            data.dependencies.len(),
            data.entrypoints.len(),
            self.output.display()
        );
        Ok(())
    }
}
