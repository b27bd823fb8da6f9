//! bundle-renderer CLI entry point.
//!
//! Parses arguments, configures logging, and dispatches to the
//! subcommand implementations in [`bundle_renderer::cli`].

use bundle_renderer::cli::Cli;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.execute() {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
