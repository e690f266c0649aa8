//! Project detection
//!
//! Classifies a source tree before any rule runs by analyzing:
//! - package.json (name, version, dependencies, workspaces)
//! - lockfiles (package manager identification)
//! - turbo.json / pnpm-workspace.yaml (monorepo markers)
//! - tsconfig.json (static typing)
//!
//! Detection never fails on missing or malformed inputs; everything
//! degrades to defaults. The only hard error is a root directory that
//! cannot be resolved at all.

use crate::models::{PackageManager, ProjectInfo, ProjectKind, WorkspaceInfo};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// The one hard failure of a scan. Everything else degrades.
#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("project root '{path}' is not readable: {source}")]
    RootUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal package.json structure for parsing
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    workspaces: Option<serde_json::Value>,
    dependencies: std::collections::HashMap<String, serde_json::Value>,
    #[serde(rename = "devDependencies")]
    dev_dependencies: std::collections::HashMap<String, serde_json::Value>,
}

impl PackageJson {
    fn dependency_version(&self, name: &str) -> Option<String> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

fn read_package_json(dir: &Path) -> Option<PackageJson> {
    let path = dir.join("package.json");
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Detect everything the doctor needs to know about the project at `root`.
///
/// Returns `DoctorError::RootUnreadable` when the root itself cannot be
/// resolved; all other inputs are optional and tolerated.
pub fn detect_project(root: &Path) -> Result<ProjectInfo, DoctorError> {
    let root = root
        .canonicalize()
        .map_err(|source| DoctorError::RootUnreadable {
            path: root.display().to_string(),
            source,
        })?;

    let pkg = read_package_json(&root);

    let dir_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());
    let name = pkg
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or(dir_name);
    let version = pkg
        .as_ref()
        .and_then(|p| p.version.clone())
        .unwrap_or_else(|| "0.0.0".to_string());

    let package_manager = detect_package_manager(&root);

    let has_turbo = root.join("turbo.json").exists();
    let has_pnpm_workspace = root.join("pnpm-workspace.yaml").exists();
    let manifest_workspaces = pkg.as_ref().and_then(|p| p.workspaces.as_ref());
    let is_monorepo = has_turbo || manifest_workspaces.is_some() || has_pnpm_workspace;

    let uses_next = pkg.as_ref().is_some_and(|p| p.has_dependency("next"));
    let kind = if has_turbo {
        ProjectKind::Monorepo
    } else if uses_next {
        ProjectKind::Next
    } else {
        ProjectKind::Node
    };

    let uses_typescript = root.join("tsconfig.json").exists()
        || pkg.as_ref().is_some_and(|p| p.has_dependency("typescript"));
    let next_version = pkg.as_ref().and_then(|p| p.dependency_version("next"));
    let typescript_version = pkg
        .as_ref()
        .and_then(|p| p.dependency_version("typescript"));

    let mut workspace_patterns = manifest_workspaces
        .map(patterns_from_manifest)
        .unwrap_or_default();
    if workspace_patterns.is_empty() && has_pnpm_workspace {
        if let Ok(content) = std::fs::read_to_string(root.join("pnpm-workspace.yaml")) {
            workspace_patterns = patterns_from_pnpm_workspace(&content);
        }
    }

    let workspaces = if is_monorepo {
        discover_workspaces(&root, &workspace_patterns)
    } else {
        Vec::new()
    };

    debug!(
        name,
        %kind,
        manager = %package_manager,
        monorepo = is_monorepo,
        workspaces = workspaces.len(),
        "detected project"
    );

    Ok(ProjectInfo {
        kind,
        name,
        root,
        version,
        package_manager,
        is_monorepo,
        workspaces,
        workspace_patterns,
        uses_typescript,
        next_version,
        typescript_version,
    })
}

/// First manager whose lockfile exists, in the fixed detection order.
pub fn detect_package_manager(root: &Path) -> PackageManager {
    for manager in PackageManager::DETECTION_ORDER {
        for lockfile in manager.lockfiles() {
            if root.join(lockfile).exists() {
                return manager;
            }
        }
    }
    PackageManager::Unknown
}

/// Workspace globs from a manifest `workspaces` field. Accepts both the
/// array form and the `{ "packages": [...] }` object form.
fn patterns_from_manifest(value: &serde_json::Value) -> Vec<String> {
    let array = match value {
        serde_json::Value::Array(a) => Some(a),
        serde_json::Value::Object(o) => o.get("packages").and_then(|p| p.as_array()),
        _ => None,
    };
    array
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Workspace globs from pnpm-workspace.yaml. Deliberately line-oriented
/// rather than a YAML parse: only the `packages:` key with indented
/// `- pattern` entries is recognized, quotes stripped. Comments and
/// flow-style lists are missed.
fn patterns_from_pnpm_workspace(content: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut in_packages = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("packages:") {
            in_packages = true;
            continue;
        }
        if in_packages {
            if let Some(rest) = trimmed.strip_prefix("- ") {
                let pattern = rest.trim().trim_matches('"').trim_matches('\'');
                if !pattern.is_empty() && !pattern.starts_with('!') {
                    patterns.push(pattern.to_string());
                }
            } else if !trimmed.is_empty() && !line.starts_with([' ', '\t']) {
                // Next top-level key ends the list.
                in_packages = false;
            }
        }
    }
    patterns
}

/// Base directory of a workspace glob. `apps/*` and `apps/**` enumerate
/// the children of `apps`; a bare `*` or `**` enumerates the children of
/// the root itself (empty base); a pattern without a trailing wildcard
/// names a single workspace directory.
pub(crate) fn pattern_base(pattern: &str) -> (&str, bool) {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed == "*" || trimmed == "**" {
        ("", true)
    } else if let Some(base) = trimmed.strip_suffix("/**") {
        (base, true)
    } else if let Some(base) = trimmed.strip_suffix("/*") {
        (base, true)
    } else {
        (trimmed, false)
    }
}

fn discover_workspaces(root: &Path, patterns: &[String]) -> Vec<WorkspaceInfo> {
    // BTreeMap keyed by relative path: dedups overlapping globs and keeps
    // the result ordered.
    let mut found: BTreeMap<String, WorkspaceInfo> = BTreeMap::new();

    for pattern in patterns {
        let (base, wildcard) = pattern_base(pattern);
        if wildcard {
            let base_dir = if base.is_empty() {
                root.to_path_buf()
            } else {
                root.join(base)
            };
            let Ok(entries) = std::fs::read_dir(&base_dir) else {
                continue;
            };
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|n| !n.starts_with('.') && n != "node_modules")
                .collect();
            names.sort();
            for child in names {
                let rel = if base.is_empty() {
                    child
                } else {
                    format!("{base}/{child}")
                };
                let info = workspace_info(root, &rel);
                found.entry(rel).or_insert(info);
            }
        } else if root.join(base).is_dir() {
            let rel = base.to_string();
            let info = workspace_info(root, &rel);
            found.entry(rel).or_insert(info);
        }
    }

    found.into_values().collect()
}

fn workspace_info(root: &Path, rel: &str) -> WorkspaceInfo {
    let absolute_path = root.join(rel);
    let pkg = read_package_json(&absolute_path);
    let has_manifest = absolute_path.join("package.json").exists();
    let dir_name = rel.rsplit('/').next().unwrap_or(rel).to_string();
    let name = pkg
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or(dir_name);
    let kind = if pkg.as_ref().is_some_and(|p| p.has_dependency("next")) {
        ProjectKind::Next
    } else {
        ProjectKind::Node
    };
    WorkspaceInfo {
        name,
        path: rel.to_string(),
        absolute_path,
        kind,
        has_manifest,
    }
}
