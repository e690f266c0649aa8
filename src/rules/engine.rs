//! Rule execution engine
//!
//! The DoctorEngine orchestrates one scan:
//! - Resolves scan roots (the project root, plus every workspace for
//!   monorepos)
//! - Selects the rules whose `applies_to` matches each root's kind
//! - Runs every (root, rule) pair in parallel on a rayon pool
//! - Rewrites workspace-local paths, aggregates per rule, scores
//! - Optionally applies fixes, serialized, after all checks finish
//!
//! A rule that returns an error or panics contributes no diagnostics
//! and the scan continues; the engine never aborts on a bad rule.

use crate::config::DoctorConfig;
use crate::models::{
    Category, Diagnostic, DiagnosticsSummary, DoctorResult, ProjectInfo, ProjectKind, RuleResult,
};
use crate::rules::base::{Rule, RuleOutcome};
use crate::rules::context::RuleContext;
use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Worker thread cap.
const MAX_WORKERS: usize = 16;

/// How many entries the slowest-rules debug summary lists.
const SLOWEST_RULES_SHOWN: usize = 5;

/// Caller-facing knobs for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Restrict the registry to one category.
    pub category: Option<Category>,
    /// Substring filter on workspace name or path. The project root is
    /// always scanned.
    pub workspace: Option<String>,
    /// Apply safe fixes after all checks complete.
    pub fix: bool,
}

/// One place rules run: a directory, the kind applicability is matched
/// against, and the project-root-relative prefix diagnostics are
/// rewritten under.
#[derive(Debug, Clone)]
struct ScanRoot {
    path: PathBuf,
    kind: ProjectKind,
    /// Empty for the project root itself.
    prefix: String,
}

/// Orchestrates rule execution across all scan roots
pub struct DoctorEngine {
    rules: Vec<Arc<dyn Rule>>,
    config: DoctorConfig,
    workers: usize,
}

impl DoctorEngine {
    /// Create an engine. `workers == 0` auto-detects, capped at 16.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(MAX_WORKERS)
        } else {
            workers.min(MAX_WORKERS)
        };
        Self {
            rules: Vec::new(),
            config: DoctorConfig::default(),
            workers,
        }
    }

    pub fn with_config(mut self, config: DoctorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        debug!("Registering rule: {}", rule.id());
        self.rules.push(rule);
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        for rule in rules {
            self.register(rule);
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run the full pipeline against a detected project.
    pub fn run(&self, project: &ProjectInfo, options: &ScanOptions) -> Result<DoctorResult> {
        let start = Instant::now();
        let roots = resolve_roots(project, options.workspace.as_deref());
        let active = self.active_rules(options.category);

        info!(
            "Scanning {} with {} rules across {} roots on {} workers",
            project.name,
            active.len(),
            roots.len(),
            self.workers
        );

        // Every eligible (root, rule) pair, registry-major so ordered
        // collection aggregates deterministically.
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (ri, rule) in active.iter().enumerate() {
            for (xi, root) in roots.iter().enumerate() {
                if rule.applies_to().contains(&root.kind) {
                    pairs.push((ri, xi));
                }
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        let outcomes: Vec<RuleOutcome> = pool.install(|| {
            pairs
                .par_iter()
                .map(|&(ri, xi)| self.run_single_rule(&active[ri], &roots[xi], project))
                .collect()
        });

        if !pairs.is_empty() {
            let listing: Vec<String> =
                slowest_rules(&active, &pairs, &outcomes, SLOWEST_RULES_SHOWN)
                    .into_iter()
                    .map(|(id, ms)| format!("{id} {ms}ms"))
                    .collect();
            debug!("Slowest rules: {}", listing.join(", "));
        }

        // Group by rule in registry order. A rule that matched no root
        // does not appear in the results at all.
        let mut rule_results: Vec<RuleResult> = Vec::new();
        for (ri, rule) in active.iter().enumerate() {
            let mut diagnostics = Vec::new();
            let mut ran = false;
            for (&(pri, pxi), outcome) in pairs.iter().zip(&outcomes) {
                if pri != ri {
                    continue;
                }
                ran = true;
                let prefix = &roots[pxi].prefix;
                diagnostics.extend(outcome.diagnostics.iter().map(|d| rewrite_path(d, prefix)));
            }
            if !ran {
                continue;
            }
            rule_results.push(RuleResult {
                rule_id: rule.id().to_string(),
                rule_name: rule.name().to_string(),
                category: rule.category(),
                passed: diagnostics.is_empty(),
                diagnostics,
            });
        }

        let diagnostics: Vec<Diagnostic> = rule_results
            .iter()
            .flat_map(|r| r.diagnostics.clone())
            .collect();
        let summary = DiagnosticsSummary::from_diagnostics(&diagnostics);
        let score = DoctorResult::score_from_counts(summary.errors, summary.warnings);
        let grade = DoctorResult::grade_from_score(score);

        let fixed_count = if options.fix {
            Some(self.apply_fixes(&active, &roots, &pairs, &outcomes, project))
        } else {
            None
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scan complete: {} diagnostics, score {} ({}) in {}ms",
            summary.total, score, grade, duration_ms
        );

        Ok(DoctorResult {
            score,
            grade,
            diagnostics,
            summary,
            project: project.clone(),
            rule_results,
            fixed_count,
            duration_ms,
        })
    }

    /// Registry minus disabled rules, minus category mismatches.
    fn active_rules(&self, category: Option<Category>) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| !self.config.is_disabled(r.id()))
            .filter(|r| category.map_or(true, |c| r.category() == c))
            .cloned()
            .collect()
    }

    fn context_for<'a>(&self, root: &ScanRoot, project: &'a ProjectInfo) -> RuleContext<'a> {
        RuleContext::new(&root.path, project, root.kind)
            .with_ignored_dirs(self.config.exclude.dirs.clone())
    }

    /// Run one rule against one root with fault isolation and timing.
    fn run_single_rule(
        &self,
        rule: &Arc<dyn Rule>,
        root: &ScanRoot,
        project: &ProjectInfo,
    ) -> RuleOutcome {
        let start = Instant::now();
        let ctx = self.context_for(root, project);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.check(&ctx)));
        let duration = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(diagnostics)) => {
                debug!(
                    "Rule {} found {} diagnostics in {}ms",
                    rule.id(),
                    diagnostics.len(),
                    duration
                );
                RuleOutcome::success(rule.id().to_string(), diagnostics, duration)
            }
            Ok(Err(e)) => {
                warn!("Rule {} failed on {}: {:#}", rule.id(), root.path.display(), e);
                RuleOutcome::failure(rule.id().to_string(), e.to_string(), duration)
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                error!("Rule {} panicked: {}", rule.id(), panic_msg);
                RuleOutcome::failure(rule.id().to_string(), format!("Panic: {panic_msg}"), duration)
            }
        }
    }

    /// Serialized fix pass over the retained outcomes. Uses the
    /// root-local diagnostics so each fix addresses files through the
    /// context they were found in; shared files (.gitignore, manifests)
    /// see one writer at a time.
    fn apply_fixes(
        &self,
        active: &[Arc<dyn Rule>],
        roots: &[ScanRoot],
        pairs: &[(usize, usize)],
        outcomes: &[RuleOutcome],
        project: &ProjectInfo,
    ) -> usize {
        let mut fixed = 0usize;
        for (&(ri, xi), outcome) in pairs.iter().zip(outcomes) {
            if !outcome.success {
                continue;
            }
            let rule = &active[ri];
            let root = &roots[xi];
            for diag in &outcome.diagnostics {
                if !diag.auto_fixable {
                    continue;
                }
                let ctx = self.context_for(root, project);
                match rule.fix(&ctx, diag) {
                    Ok(true) => {
                        info!("Fixed {} in {}", diag.rule_id, diag.file_path);
                        fixed += 1;
                    }
                    Ok(false) => {}
                    Err(e) => warn!("Fix for {} failed: {:#}", diag.rule_id, e),
                }
            }
        }
        fixed
    }
}

impl Default for DoctorEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The project root always scans; for monorepos it scans under the
/// monorepo kind even when monorepo-ness came from a workspaces field
/// alone, so monorepo rules run there. Workspace roots use each
/// workspace's own kind.
fn resolve_roots(project: &ProjectInfo, workspace_filter: Option<&str>) -> Vec<ScanRoot> {
    let root_kind = if project.is_monorepo {
        ProjectKind::Monorepo
    } else {
        project.kind
    };
    let mut roots = vec![ScanRoot {
        path: project.root.clone(),
        kind: root_kind,
        prefix: String::new(),
    }];
    if project.is_monorepo {
        for ws in &project.workspaces {
            if let Some(filter) = workspace_filter {
                if !ws.name.contains(filter) && !ws.path.contains(filter) {
                    debug!("Skipping workspace {} (filter '{}')", ws.name, filter);
                    continue;
                }
            }
            roots.push(ScanRoot {
                path: ws.absolute_path.clone(),
                kind: ws.kind,
                prefix: ws.path.clone(),
            });
        }
    }
    roots
}

fn rewrite_path(diag: &Diagnostic, prefix: &str) -> Diagnostic {
    let mut out = diag.clone();
    if !prefix.is_empty() {
        out.file_path = if out.file_path.is_empty() {
            prefix.to_string()
        } else {
            format!("{}/{}", prefix, out.file_path)
        };
    }
    out
}

/// Per-rule check time summed across roots, slowest first. Rules that
/// matched no root are left out; ties break on rule id so the listing
/// is stable.
fn slowest_rules(
    active: &[Arc<dyn Rule>],
    pairs: &[(usize, usize)],
    outcomes: &[RuleOutcome],
    limit: usize,
) -> Vec<(&'static str, u64)> {
    let mut totals = vec![(false, 0u64); active.len()];
    for (&(ri, _), outcome) in pairs.iter().zip(outcomes) {
        totals[ri].0 = true;
        totals[ri].1 += outcome.duration_ms;
    }
    let mut timed: Vec<(&'static str, u64)> = active
        .iter()
        .zip(totals)
        .filter(|(_, (ran, _))| *ran)
        .map(|(rule, (_, ms))| (rule.id(), ms))
        .collect();
    timed.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    timed.truncate(limit);
    timed
}
