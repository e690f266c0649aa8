//! Repomedic - project doctor CLI
//!
//! A fast, local-first health check for JavaScript/TypeScript repos:
//! framework conventions, monorepo consistency, hygiene, dead code.

use anyhow::Result;
use clap::Parser;
use repomedic::cli::{self, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose raises the default filter to per-rule debug; an explicit
    // RUST_LOG always takes precedence.
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repomedic=debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cli::run(cli)
}
