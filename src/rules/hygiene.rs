//! Repository hygiene rules
//!
//! Checks that apply to every project kind: lockfile discipline,
//! .gitignore coverage, committed env files, and TypeScript strictness.
//! Fixes in this module only create files or append lines; they never
//! delete anything.

use crate::models::{Category, Diagnostic, PackageManager, ProjectKind, Severity};
use crate::rules::base::Rule;
use crate::rules::context::RuleContext;
use anyhow::Result;

const ALL_KINDS: &[ProjectKind] = &[
    ProjectKind::Node,
    ProjectKind::Next,
    ProjectKind::Monorepo,
];

/// Env files that must never be committed. `.env.example` and friends
/// are deliberately not in this list.
const ENV_FILES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.development",
    ".env.production",
];

const STARTER_GITIGNORE: &str = "\
# Dependencies
node_modules/

# Build output
dist/
build/
out/
.next/

# Environment
.env*

# Coverage
coverage/
";

/// True when any non-comment line of a .gitignore matches `name`
/// (leading/trailing slashes ignored).
fn ignores_entry(gitignore: &str, name: &str) -> bool {
    gitignore.lines().any(|line| {
        let line = line.trim();
        !line.starts_with('#')
            && line.trim_start_matches('/').trim_end_matches('/') == name
    })
}

/// True when some non-comment line starts with `prefix` (after stripping
/// a leading slash). Used for `.env`-family coverage, where `.env*`,
/// `.env` and `.env.local` all count.
fn ignores_prefix(gitignore: &str, prefix: &str) -> bool {
    gitignore.lines().any(|line| {
        let line = line.trim();
        !line.starts_with('#') && line.trim_start_matches('/').starts_with(prefix)
    })
}

/// Append each missing line to a root-level file, creating it when
/// absent. Returns whether anything changed, which makes the fixes
/// built on it idempotent.
fn append_missing_lines(ctx: &RuleContext, rel: &str, lines: &[String]) -> Result<bool> {
    let existing = ctx.read_file(rel).unwrap_or_default();
    let present: Vec<&str> = existing.lines().map(|l| l.trim()).collect();
    let missing: Vec<&String> = lines
        .iter()
        .filter(|l| !present.contains(&l.trim()))
        .collect();
    if missing.is_empty() {
        return Ok(false);
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    for line in missing {
        updated.push_str(line);
        updated.push('\n');
    }
    ctx.write_file(rel, &updated)?;
    Ok(true)
}

/// Lockfiles present in this root, in detection order.
fn present_lockfiles(ctx: &RuleContext) -> Vec<(PackageManager, &'static str)> {
    let mut present = Vec::new();
    for manager in PackageManager::DETECTION_ORDER {
        for lockfile in manager.lockfiles() {
            if ctx.file_exists(lockfile) {
                present.push((manager, *lockfile));
            }
        }
    }
    present
}

/// More than one package manager's lockfile in the same root.
pub struct OneLockfileRule;

impl Rule for OneLockfileRule {
    fn id(&self) -> &'static str {
        "hygiene/one-lockfile"
    }
    fn name(&self) -> &'static str {
        "Single lockfile"
    }
    fn category(&self) -> Category {
        Category::Hygiene
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn help(&self) -> &'static str {
        "Keep only the lockfile of the package manager in use; delete the others and ignore them in .gitignore."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        ALL_KINDS
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let present = present_lockfiles(ctx);
        if present.len() <= 1 {
            return Ok(vec![]);
        }
        let (primary, _) = present[0];
        let names: Vec<&str> = present.iter().map(|(_, f)| *f).collect();
        let mut diag = self.diagnostic(
            present[1].1,
            format!(
                "Multiple lockfiles found: {}. The project resolves to {}.",
                names.join(", "),
                primary
            ),
        );
        diag.auto_fixable = true;
        Ok(vec![diag])
    }

    fn fix(&self, ctx: &RuleContext, _diagnostic: &Diagnostic) -> Result<bool> {
        let present = present_lockfiles(ctx);
        if present.len() <= 1 {
            return Ok(false);
        }
        let extras: Vec<String> = present[1..].iter().map(|(_, f)| f.to_string()).collect();
        append_missing_lines(ctx, ".gitignore", &extras)
    }
}

/// Missing .gitignore, or one that does not cover node_modules.
pub struct GitignoreRule;

impl Rule for GitignoreRule {
    fn id(&self) -> &'static str {
        "hygiene/gitignore"
    }
    fn name(&self) -> &'static str {
        "Gitignore coverage"
    }
    fn category(&self) -> Category {
        Category::Hygiene
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Add a .gitignore that covers node_modules and build output."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        ALL_KINDS
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let mut diags = Vec::new();
        match ctx.read_file(".gitignore") {
            None => {
                let mut diag =
                    self.diagnostic(".gitignore", "No .gitignore file found.".to_string());
                diag.auto_fixable = true;
                diags.push(diag);
            }
            Some(content) => {
                if !ignores_entry(&content, "node_modules") {
                    let mut diag = self.diagnostic(
                        ".gitignore",
                        "node_modules is not covered by .gitignore.".to_string(),
                    );
                    diag.auto_fixable = true;
                    diags.push(diag);
                }
            }
        }
        Ok(diags)
    }

    fn fix(&self, ctx: &RuleContext, _diagnostic: &Diagnostic) -> Result<bool> {
        match ctx.read_file(".gitignore") {
            None => {
                ctx.write_file(".gitignore", STARTER_GITIGNORE)?;
                Ok(true)
            }
            Some(content) => {
                if ignores_entry(&content, "node_modules") {
                    return Ok(false);
                }
                append_missing_lines(ctx, ".gitignore", &["node_modules/".to_string()])
            }
        }
    }
}

/// Env files on disk that .gitignore does not cover.
pub struct EnvNotIgnoredRule;

impl Rule for EnvNotIgnoredRule {
    fn id(&self) -> &'static str {
        "hygiene/env-not-ignored"
    }
    fn name(&self) -> &'static str {
        "Env files ignored"
    }
    fn category(&self) -> Category {
        Category::Hygiene
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn help(&self) -> &'static str {
        "Add .env* to .gitignore; env files usually hold secrets."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Only well-known .env filenames are checked; custom names like secrets.json are not.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        ALL_KINDS
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let present: Vec<&str> = ENV_FILES
            .iter()
            .copied()
            .filter(|f| ctx.file_exists(f))
            .collect();
        if present.is_empty() {
            return Ok(vec![]);
        }
        let gitignore = ctx.read_file(".gitignore").unwrap_or_default();
        if ignores_prefix(&gitignore, ".env") {
            return Ok(vec![]);
        }
        let mut diag = self.diagnostic(
            present[0],
            format!(
                "Env file(s) not covered by .gitignore: {}.",
                present.join(", ")
            ),
        );
        diag.auto_fixable = true;
        Ok(vec![diag])
    }

    fn fix(&self, ctx: &RuleContext, _diagnostic: &Diagnostic) -> Result<bool> {
        let gitignore = ctx.read_file(".gitignore").unwrap_or_default();
        if ignores_prefix(&gitignore, ".env") {
            return Ok(false);
        }
        append_missing_lines(ctx, ".gitignore", &[".env*".to_string()])
    }
}

/// tsconfig.json present but strict mode off.
pub struct TsStrictRule;

impl Rule for TsStrictRule {
    fn id(&self) -> &'static str {
        "hygiene/ts-strict"
    }
    fn name(&self) -> &'static str {
        "TypeScript strict mode"
    }
    fn category(&self) -> Category {
        Category::Hygiene
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Set compilerOptions.strict to true in tsconfig.json."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("tsconfig files with comments fail the JSON parse and are skipped; extends chains are not followed.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        ALL_KINDS
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let Some(tsconfig) = ctx.read_json("tsconfig.json") else {
            return Ok(vec![]);
        };
        let strict = tsconfig
            .get("compilerOptions")
            .and_then(|o| o.get("strict"))
            .and_then(|s| s.as_bool())
            .unwrap_or(false);
        if strict {
            return Ok(vec![]);
        }
        Ok(vec![self.diagnostic(
            "tsconfig.json",
            "TypeScript strict mode is not enabled.".to_string(),
        )])
    }
}
