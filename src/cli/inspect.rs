//! The `inspect` subcommand.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::manifest::{Manifest, ResourceMeta};
use crate::resolver::{RenderOptions, RendererContext};

/// Arguments for `bundle-renderer inspect`.
#[derive(Args)]
pub struct InspectCommand {
    /// Path to the manifest JSON file.
    pub manifest: PathBuf,

    /// Resolve and print this module's dependency sets instead of the
    /// manifest summary.
    #[arg(long)]
    pub id: Option<String>,
}

impl InspectCommand {
    /// Print a manifest summary or one module's resolution.
    pub fn execute(self) -> Result<()> {
        let manifest = Manifest::load(&self.manifest)?;
        let context = RendererContext::new(RenderOptions::from_manifest(manifest.clone()))?;

        match &self.id {
            Some(id) => {
                let deps = context.resolve(id);
                print_set("scripts", &deps.scripts);
                print_set("styles", &deps.styles);
                print_set("preload", &deps.preload);
                print_set("prefetch", &deps.prefetch);
            }
            None => {
                println!("{} {} modules", "manifest:".bold(), manifest.len());
                println!("{}", "entrypoints:".bold());
                for id in context.entrypoints() {
                    println!("  {id}");
                }
                let dynamic = manifest.dynamic_entrypoints();
                if !dynamic.is_empty() {
                    println!("{}", "dynamic entrypoints:".bold());
                    for id in dynamic {
                        println!("  {id}");
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_set(label: &str, set: &IndexMap<String, ResourceMeta>) {
    println!("{}", format!("{label}:").bold());
    for (id, meta) in set {
        if meta.file.is_empty() || meta.file == *id {
            println!("  {id}");
        } else {
            println!("  {id} -> {}", meta.file);
        }
    }
}
