//! CLI command definitions and handlers

mod init;
mod rules;
mod scan;

use crate::models::Category;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (0 = auto, max 64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

/// Repomedic - project health checks for JavaScript/TypeScript repos
#[derive(Parser, Debug)]
#[command(name = "repomedic")]
#[command(
    version,
    about = "Project doctor for JavaScript/TypeScript repos: framework conventions, monorepo consistency, repository hygiene, and dead code",
    long_about = "Repomedic inspects a JavaScript/TypeScript project, classifies it \
(plain Node, Next.js app, or monorepo), and runs a battery of independent rule checks \
against it. Findings are aggregated into a 0-100 score with a letter grade; some \
problems can be repaired automatically with --fix.\n\n\
Checks are heuristic and read-only; nothing is written unless --fix is given.",
    after_help = "\
Examples:
  repomedic .                          Check the current directory
  repomedic . --json                   JSON output for scripting
  repomedic . --score                  Print just the 0-100 score
  repomedic . --category hygiene       Run a single rule category
  repomedic . --workspace web          Monorepo: only workspaces matching 'web'
  repomedic . --dry-run                Show what --fix would change
  repomedic . --fix                    Apply safe auto-fixes
  repomedic rules                      List every rule with its bias notes"
)]
pub struct Cli {
    /// Path to the project (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Restrict to one rule category (framework, monorepo, hygiene, dead)
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Monorepo: only scan workspaces whose name or path contains this substring
    #[arg(long)]
    pub workspace: Option<String>,

    /// Output the full result as JSON
    #[arg(long, conflicts_with = "score")]
    pub json: bool,

    /// Output only the 0-100 score
    #[arg(long)]
    pub score: bool,

    /// List what --fix would change, without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Apply safe auto-fixes after the scan
    #[arg(long)]
    pub fix: bool,

    /// Number of parallel workers (0 = auto, max 64)
    #[arg(long, global = true, default_value = "0", value_parser = parse_workers)]
    pub workers: usize,

    /// Verbose logging (per-rule timing and skip reasons)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every rule with category, severity, applicability, and bias notes
    Rules,

    /// Write a starter repomedic.toml config file
    Init,

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Rules) => rules::run(),
        Some(Commands::Init) => init::run(&cli.path),
        Some(Commands::Version) => {
            println!("repomedic {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => scan::run(scan::ScanArgs {
            path: &cli.path,
            category: cli.category,
            workspace: cli.workspace.as_deref(),
            json: cli.json,
            score_only: cli.score,
            dry_run: cli.dry_run,
            fix: cli.fix,
            workers: cli.workers,
        }),
    }
}
