//! Core data models for repomedic
//!
//! These models are used throughout the codebase for representing
//! the detected project, rule diagnostics, and scan results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Severity levels for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Rule categories. Each rule belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Framework,
    Monorepo,
    Hygiene,
    Dead,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Framework,
        Category::Monorepo,
        Category::Hygiene,
        Category::Dead,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Framework => write!(f, "framework"),
            Category::Monorepo => write!(f, "monorepo"),
            Category::Hygiene => write!(f, "hygiene"),
            Category::Dead => write!(f, "dead"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "framework" => Ok(Category::Framework),
            "monorepo" => Ok(Category::Monorepo),
            "hygiene" => Ok(Category::Hygiene),
            "dead" | "dead-code" => Ok(Category::Dead),
            other => Err(format!(
                "unknown category '{other}' (expected framework, monorepo, hygiene, or dead)"
            )),
        }
    }
}

/// What kind of project a scan root is. Rules declare which kinds they
/// apply to; the engine only runs a rule on roots of a matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Node,
    #[serde(rename = "nextjs")]
    Next,
    Monorepo,
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectKind::Node => write!(f, "node"),
            ProjectKind::Next => write!(f, "nextjs"),
            ProjectKind::Monorepo => write!(f, "monorepo"),
        }
    }
}

/// Package manager, identified by its lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
    #[default]
    Unknown,
}

impl PackageManager {
    /// Detection order. First manager whose lockfile exists wins.
    pub const DETECTION_ORDER: [PackageManager; 4] = [
        PackageManager::Pnpm,
        PackageManager::Bun,
        PackageManager::Yarn,
        PackageManager::Npm,
    ];

    /// Lockfile names this manager writes.
    pub fn lockfiles(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["package-lock.json"],
            PackageManager::Pnpm => &["pnpm-lock.yaml"],
            PackageManager::Yarn => &["yarn.lock"],
            PackageManager::Bun => &["bun.lockb", "bun.lock"],
            PackageManager::Unknown => &[],
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageManager::Npm => write!(f, "npm"),
            PackageManager::Pnpm => write!(f, "pnpm"),
            PackageManager::Yarn => write!(f, "yarn"),
            PackageManager::Bun => write!(f, "bun"),
            PackageManager::Unknown => write!(f, "unknown"),
        }
    }
}

/// One workspace of a monorepo.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceInfo {
    pub name: String,
    /// Root-relative path, forward slashes.
    pub path: String,
    pub absolute_path: PathBuf,
    pub kind: ProjectKind,
    pub has_manifest: bool,
}

/// Immutable snapshot of everything the detector learned about a project.
/// Computed once per scan; rules and reporters only ever read it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectInfo {
    pub kind: ProjectKind,
    pub name: String,
    /// Absolute, canonicalized project root.
    pub root: PathBuf,
    pub version: String,
    pub package_manager: PackageManager,
    pub is_monorepo: bool,
    /// Empty unless `is_monorepo`.
    #[serde(default)]
    pub workspaces: Vec<WorkspaceInfo>,
    /// Raw workspace glob patterns as declared, for consistency checks.
    #[serde(default)]
    pub workspace_patterns: Vec<String>,
    pub uses_typescript: bool,
    #[serde(default)]
    pub next_version: Option<String>,
    #[serde(default)]
    pub typescript_version: Option<String>,
}

/// One problem found by a rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diagnostic {
    #[serde(default)]
    pub rule_id: String,
    /// Relative to the overall project root, forward slashes. The engine
    /// rewrites workspace-local paths before the diagnostic leaves it.
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub auto_fixable: bool,
}

/// Per-rule outcome. Only rules that ran on at least one root appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,
    pub category: Category,
    /// True iff the rule produced zero diagnostics across every root it
    /// ran on.
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of diagnostics by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    pub errors: usize,
    pub warnings: usize,
    pub auto_fixable: usize,
    pub total: usize,
}

impl DiagnosticsSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Self::default();
        for d in diagnostics {
            match d.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            if d.auto_fixable {
                summary.auto_fixable += 1;
            }
            summary.total += 1;
        }
        summary
    }
}

/// Full result of one doctor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResult {
    /// 0-100, higher is healthier.
    pub score: u32,
    pub grade: String,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: DiagnosticsSummary,
    pub project: ProjectInfo,
    pub rule_results: Vec<RuleResult>,
    /// Present only when the fix phase ran.
    pub fixed_count: Option<usize>,
    pub duration_ms: u64,
}

impl DoctorResult {
    /// Score from severity counts: 100 minus 5 per error and 2 per
    /// warning, clamped to 0-100.
    pub fn score_from_counts(errors: usize, warnings: usize) -> u32 {
        let penalty = (errors as i64) * 5 + (warnings as i64) * 2;
        (100i64 - penalty).clamp(0, 100) as u32
    }

    /// Letter grade in 5-point bands.
    pub fn grade_from_score(score: u32) -> String {
        match score {
            s if s >= 95 => "A+".to_string(),
            s if s >= 90 => "A".to_string(),
            s if s >= 85 => "A-".to_string(),
            s if s >= 80 => "B+".to_string(),
            s if s >= 75 => "B".to_string(),
            s if s >= 70 => "B-".to_string(),
            s if s >= 65 => "C+".to_string(),
            s if s >= 60 => "C".to_string(),
            s if s >= 55 => "C-".to_string(),
            s if s >= 50 => "D".to_string(),
            _ => "F".to_string(),
        }
    }
}
