//! Repomedic - project doctor for JavaScript/TypeScript repos
//!
//! Inspects a source tree, classifies the project (plain Node, Next.js
//! app, or monorepo), and runs a battery of independent rule checks
//! against it through a sandboxed per-root file context. Findings are
//! aggregated into a 0-100 score with a letter grade; some problems can
//! be repaired with safe, idempotent auto-fixes.
//!
//! # Example
//!
//! ```no_run
//! use repomedic::detect::detect_project;
//! use repomedic::rules::{default_rules, DoctorEngine, ScanOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let project = detect_project(std::path::Path::new("."))?;
//! let mut engine = DoctorEngine::new(0);
//! engine.register_all(default_rules());
//! let result = engine.run(&project, &ScanOptions::default())?;
//! println!("{}/100 ({})", result.score, result.grade);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod models;
pub mod reporters;
pub mod rules;
