//! Command-line interface for bundle-renderer.
//!
//! The binary exposes the build-time half of the crate: precomputing
//! dependency tables from manifests and inspecting what the resolver
//! would produce for a given module.

pub mod inspect;
pub mod precompute;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Build-time tooling for SSR bundle manifests.
#[derive(Parser)]
#[command(
    name = "bundle-renderer",
    about = "Precompute and inspect SSR dependency tables from bundler manifests",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Precompute the flattened dependency table for a manifest.
    ///
    /// Reads a bundler manifest (Vite, canonical, or legacy webpack —
    /// detected automatically), resolves every module, and writes a
    /// serialized bundle a server can load in place of the manifest.
    Precompute(precompute::PrecomputeCommand),

    /// Inspect a manifest's entry points or one module's resolved
    /// dependency sets.
    Inspect(inspect::InspectCommand),
}

impl Cli {
    /// Dispatch the selected subcommand.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Precompute(cmd) => cmd.execute(),
            Commands::Inspect(cmd) => cmd.execute(),
        }
    }
}
