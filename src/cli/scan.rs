//! Scan command - detect the project and run every applicable rule

use crate::config;
use crate::detect;
use crate::models::Category;
use crate::reporters::{self, OutputFormat};
use crate::rules::{default_rules, DoctorEngine, ScanOptions};
use anyhow::Result;
use console::style;
use std::path::Path;

pub(super) struct ScanArgs<'a> {
    pub path: &'a Path,
    pub category: Option<Category>,
    pub workspace: Option<&'a str>,
    pub json: bool,
    pub score_only: bool,
    pub dry_run: bool,
    pub fix: bool,
    pub workers: usize,
}

pub(super) fn run(args: ScanArgs) -> Result<()> {
    let project = detect::detect_project(args.path)?;
    let config = config::load_config(&project.root);

    let mut engine = DoctorEngine::new(args.workers).with_config(config);
    engine.register_all(default_rules());

    let options = ScanOptions {
        category: args.category,
        workspace: args.workspace.map(str::to_string),
        // A dry run reports fixable problems without touching anything.
        fix: args.fix && !args.dry_run,
    };
    let result = engine.run(&project, &options)?;

    let format = if args.json {
        OutputFormat::Json
    } else if args.score_only {
        OutputFormat::Score
    } else {
        OutputFormat::Text
    };
    let output = reporters::report(&result, format)?;
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }

    if args.dry_run && format == OutputFormat::Text {
        let fixable: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.auto_fixable)
            .collect();
        if fixable.is_empty() {
            println!("{}", style("Dry run: nothing to fix.").dim());
        } else {
            println!("{}", style("Dry run: --fix would repair:").bold());
            for diag in fixable {
                println!(
                    "  {}  {}",
                    style(&diag.file_path).cyan(),
                    style(&diag.rule_id).dim()
                );
            }
        }
    }

    // Findings are data, not process failure: a completed scan exits 0.
    Ok(())
}
