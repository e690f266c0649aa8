//! Monorepo convention rules
//!
//! Workspace-level consistency checks. All of these run on the project
//! root of a monorepo; they read workspace manifests through the
//! detection snapshot carried by the context.

use crate::detect::pattern_base;
use crate::models::{Category, Diagnostic, ProjectKind, Severity};
use crate::rules::base::Rule;
use crate::rules::context::RuleContext;
use anyhow::Result;
use std::collections::BTreeMap;

const MONOREPO_ONLY: &[ProjectKind] = &[ProjectKind::Monorepo];

/// Cap on reported version divergences per scan.
const MAX_VERSION_DIVERGENCES: usize = 10;

/// Version specs excluded from cross-workspace comparison. These are
/// intentional internal links, not registry versions.
const LOCAL_SPEC_PREFIXES: &[&str] = &["workspace:", "file:", "link:", "portal:"];

fn manifest_dependencies(value: &serde_json::Value) -> Vec<(String, String)> {
    let mut deps = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(map) = value.get(section).and_then(|d| d.as_object()) {
            for (name, spec) in map {
                if let Some(spec) = spec.as_str() {
                    deps.push((name.clone(), spec.to_string()));
                }
            }
        }
    }
    deps
}

/// A discovered workspace directory without its own manifest.
pub struct WorkspaceManifestsRule;

impl Rule for WorkspaceManifestsRule {
    fn id(&self) -> &'static str {
        "monorepo/workspace-manifests"
    }
    fn name(&self) -> &'static str {
        "Workspace manifests"
    }
    fn category(&self) -> Category {
        Category::Monorepo
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Every workspace directory needs its own package.json, or it should be moved out of the workspace globs."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        MONOREPO_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        Ok(ctx
            .project
            .workspaces
            .iter()
            .filter(|w| !w.has_manifest)
            .map(|w| {
                self.diagnostic(
                    &w.path,
                    format!("Workspace directory '{}' has no package.json.", w.path),
                )
            })
            .collect())
    }
}

/// The same dependency requested at different versions across workspaces.
pub struct ConsistentVersionsRule;

impl Rule for ConsistentVersionsRule {
    fn id(&self) -> &'static str {
        "monorepo/consistent-versions"
    }
    fn name(&self) -> &'static str {
        "Consistent dependency versions"
    }
    fn category(&self) -> Category {
        Category::Monorepo
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Align the version spec across workspaces, or hoist the dependency to the root."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Specs are compared textually: ^18.2.0 and 18.2.0 count as divergent even when they resolve identically.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        MONOREPO_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        // dep name -> spec -> requesters, all BTree for deterministic output.
        let mut requested: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        let mut record = |manifest: &serde_json::Value, owner: &str| {
            for (name, spec) in manifest_dependencies(manifest) {
                if LOCAL_SPEC_PREFIXES.iter().any(|p| spec.starts_with(p)) {
                    continue;
                }
                requested
                    .entry(name)
                    .or_default()
                    .entry(spec)
                    .or_default()
                    .push(owner.to_string());
            }
        };

        if let Some(root_manifest) = ctx.read_json("package.json") {
            record(&root_manifest, "root");
        }
        for ws in &ctx.project.workspaces {
            if !ws.has_manifest {
                continue;
            }
            let manifest_path = format!("{}/package.json", ws.path);
            if let Some(manifest) = ctx.read_json(&manifest_path) {
                record(&manifest, &ws.path);
            }
        }

        let mut diags = Vec::new();
        for (dep, specs) in &requested {
            if specs.len() < 2 {
                continue;
            }
            if diags.len() >= MAX_VERSION_DIVERGENCES {
                break;
            }
            let detail: Vec<String> = specs
                .iter()
                .map(|(spec, owners)| format!("{} ({})", spec, owners.join(", ")))
                .collect();
            diags.push(self.diagnostic(
                "package.json",
                format!(
                    "Dependency '{}' is requested at {} different versions: {}.",
                    dep,
                    specs.len(),
                    detail.join("; ")
                ),
            ));
        }
        Ok(diags)
    }
}

/// Runtime dependencies declared at the monorepo root.
pub struct RootDepsRule;

impl Rule for RootDepsRule {
    fn id(&self) -> &'static str {
        "monorepo/no-app-deps-at-root"
    }
    fn name(&self) -> &'static str {
        "No app dependencies at root"
    }
    fn category(&self) -> Category {
        Category::Monorepo
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Move runtime dependencies into the workspace that uses them; keep only tooling (devDependencies) at the root."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Root runtime dependencies are occasionally intentional; this only warns.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        MONOREPO_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let Some(manifest) = ctx.read_json("package.json") else {
            return Ok(vec![]);
        };
        let Some(deps) = manifest.get("dependencies").and_then(|d| d.as_object()) else {
            return Ok(vec![]);
        };
        if deps.is_empty() {
            return Ok(vec![]);
        }
        let mut names: Vec<&str> = deps.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        let shown = names.iter().take(5).copied().collect::<Vec<_>>().join(", ");
        let suffix = if names.len() > 5 {
            format!(" and {} more", names.len() - 5)
        } else {
            String::new()
        };
        Ok(vec![self.diagnostic(
            "package.json",
            format!(
                "Monorepo root declares {} runtime dependencies: {}{}.",
                names.len(),
                shown,
                suffix
            ),
        )])
    }
}

/// A workspace glob that matched no directories.
pub struct EmptyGlobsRule;

impl Rule for EmptyGlobsRule {
    fn id(&self) -> &'static str {
        "monorepo/empty-globs"
    }
    fn name(&self) -> &'static str {
        "Workspace globs match"
    }
    fn category(&self) -> Category {
        Category::Monorepo
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Remove stale workspace patterns or create the directories they expect."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        MONOREPO_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        // Patterns live in package.json when a workspaces field exists,
        // otherwise in pnpm-workspace.yaml.
        let declared_in = if ctx
            .read_json("package.json")
            .is_some_and(|m| m.get("workspaces").is_some())
        {
            "package.json"
        } else {
            "pnpm-workspace.yaml"
        };

        let mut diags = Vec::new();
        for pattern in &ctx.project.workspace_patterns {
            let (base, wildcard) = pattern_base(pattern);
            let matched = ctx.project.workspaces.iter().any(|w| {
                if wildcard && base.is_empty() {
                    // Bare `*` covers the root's immediate children.
                    !w.path.contains('/')
                } else if wildcard {
                    w.path.starts_with(&format!("{base}/"))
                } else {
                    w.path == base
                }
            });
            if !matched {
                diags.push(self.diagnostic(
                    declared_in,
                    format!("Workspace pattern '{}' matches no directories.", pattern),
                ));
            }
        }
        Ok(diags)
    }
}

/// Monorepo root manifest not marked private.
pub struct RootPrivateRule;

impl Rule for RootPrivateRule {
    fn id(&self) -> &'static str {
        "monorepo/root-private"
    }
    fn name(&self) -> &'static str {
        "Private monorepo root"
    }
    fn category(&self) -> Category {
        Category::Monorepo
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn help(&self) -> &'static str {
        "Set \"private\": true in the root package.json so the umbrella package can never be published."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        MONOREPO_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let Some(manifest) = ctx.read_json("package.json") else {
            return Ok(vec![]);
        };
        let private = manifest
            .get("private")
            .and_then(|p| p.as_bool())
            .unwrap_or(false);
        if private {
            return Ok(vec![]);
        }
        let mut diag = self.diagnostic(
            "package.json",
            "Monorepo root package.json is not marked \"private\": true.".to_string(),
        );
        diag.auto_fixable = true;
        Ok(vec![diag])
    }

    fn fix(&self, ctx: &RuleContext, _diagnostic: &Diagnostic) -> Result<bool> {
        let Some(mut manifest) = ctx.read_json("package.json") else {
            return Ok(false);
        };
        let Some(obj) = manifest.as_object_mut() else {
            return Ok(false);
        };
        if obj.get("private").and_then(|p| p.as_bool()) == Some(true) {
            return Ok(false);
        }
        obj.insert("private".to_string(), serde_json::Value::Bool(true));
        let mut serialized = serde_json::to_string_pretty(&manifest)?;
        serialized.push('\n');
        ctx.write_file("package.json", &serialized)?;
        Ok(true)
    }
}
