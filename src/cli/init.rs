//! Init command - write a starter config file

use crate::config::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const STARTER_CONFIG: &str = r#"# Repomedic configuration

[rules]
# Rule ids to skip, e.g. "hygiene/ts-strict". `repomedic rules` lists them.
disable = []

[exclude]
# Directory names skipped during scans, in addition to the built-in list
# (node_modules, dist, build, out, coverage, and dot-directories).
dirs = []
"#;

/// Run the init command
pub(super) fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} {} already exists",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nNext steps:");
    println!("  {} Run the doctor", style("repomedic .").cyan());
    println!("  {} See every rule", style("repomedic rules").cyan());
    Ok(())
}
