//! Dead code rules - files and exports nothing references
//!
//! Three cooperating heuristics:
//! - orphan files: an over-approximated import graph built from
//!   line-oriented import/require scans; a file none of whose path
//!   variants appear in the imported set is an orphan
//! - unused exports: exported identifiers whole-word-matched at most
//!   once (their own declaration) across all scanned content
//! - unused components: capitalized component files never referenced by
//!   a JSX tag or an import
//!
//! No AST, no module resolution beyond relative paths. Caps and ratio
//! guards keep the over-approximation from flooding a report.

use crate::models::{Category, Diagnostic, ProjectKind, Severity};
use crate::rules::base::Rule;
use crate::rules::context::{RuleContext, SOURCE_EXTENSIONS};
use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

const NODE_AND_NEXT: &[ProjectKind] = &[ProjectKind::Node, ProjectKind::Next];
const NEXT_ONLY: &[ProjectKind] = &[ProjectKind::Next];

/// Walk depth for dead-code scans.
const SCAN_DEPTH: usize = 10;

/// Orphans above this share of all scanned files mean the import graph
/// is probably blind (path aliases, custom resolvers): report nothing.
const ORPHAN_RATIO_LIMIT: f64 = 0.30;

const MAX_ORPHANS: usize = 20;
const MAX_UNUSED_EXPORTS: usize = 15;
const MAX_UNUSED_COMPONENTS: usize = 10;

/// Unused-export analysis is skipped entirely above this file count.
const EXPORT_SCAN_FILE_LIMIT: usize = 400;

/// Base filenames reachable without any import: framework routing,
/// runtime hooks, and conventional package/CLI entries.
static ENTRY_POINT_NAMES: &[&str] = &[
    // Next.js App Router conventions
    "page",
    "layout",
    "loading",
    "error",
    "global-error",
    "not-found",
    "template",
    "default",
    "route",
    // Runtime hooks
    "middleware",
    "instrumentation",
    // Package and CLI entries
    "index",
    "main",
    "cli",
    "server",
    "app",
    "_app",
    "_document",
];

/// Path prefixes whose files are auto-loaded by convention.
static AUTO_LOADED_PREFIXES: &[&str] = &["pages/", "src/pages/", "scripts/", "bin/"];

/// Export names frameworks read by convention; never reported unused.
static RESERVED_EXPORT_NAMES: &[&str] = &[
    // App Router metadata and segment config
    "metadata",
    "viewport",
    "revalidate",
    "dynamic",
    "dynamicParams",
    "fetchCache",
    "runtime",
    "preferredRegion",
    "maxDuration",
    "generateMetadata",
    "generateViewport",
    "generateStaticParams",
    "generateImageMetadata",
    "config",
    // Route handlers
    "GET",
    "POST",
    "PUT",
    "PATCH",
    "DELETE",
    "HEAD",
    "OPTIONS",
    // Pages Router data functions
    "getServerSideProps",
    "getStaticProps",
    "getStaticPaths",
    "getInitialProps",
    "reportWebVitals",
    "register",
];

static IMPORT_FROM: OnceLock<Regex> = OnceLock::new();
static IMPORT_BARE: OnceLock<Regex> = OnceLock::new();
static REQUIRE_CALL: OnceLock<Regex> = OnceLock::new();
static DYNAMIC_IMPORT: OnceLock<Regex> = OnceLock::new();
static EXPORT_DECL: OnceLock<Regex> = OnceLock::new();

fn import_from() -> &'static Regex {
    // [^;]*? crosses newlines, so multi-line import statements resolve.
    IMPORT_FROM.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:import|export)\b[^;]*?from\s+['"]([^'"]+)['"]"#).unwrap()
    })
}

fn import_bare() -> &'static Regex {
    IMPORT_BARE.get_or_init(|| Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).unwrap())
}

fn require_call() -> &'static Regex {
    REQUIRE_CALL.get_or_init(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap())
}

fn dynamic_import() -> &'static Regex {
    DYNAMIC_IMPORT.get_or_init(|| Regex::new(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap())
}

fn export_decl() -> &'static Regex {
    EXPORT_DECL.get_or_init(|| {
        Regex::new(
            r"^export\s+(?:default\s+)?(?:async\s+)?(?:function\*?|const|let|var|class|abstract\s+class|type|interface|enum)\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .unwrap()
    })
}

/// Every import target mentioned in `content`, unresolved.
fn import_targets(content: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for re in [import_from(), import_bare(), require_call(), dynamic_import()] {
        for cap in re.captures_iter(content) {
            targets.push(cap[1].to_string());
        }
    }
    targets
}

/// Resolve a relative import target against the importer's directory.
/// Non-relative targets (bare packages, aliases) return `None`; the
/// orphan ratio guard covers what this misses.
fn resolve_relative(importer: &str, target: &str) -> Option<String> {
    if !target.starts_with("./") && !target.starts_with("../") {
        return None;
    }
    let dir = importer.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Register every plausible on-disk spelling of a resolved import:
/// bare, with each source extension, and as a directory index.
fn register_variants(imported: &mut HashSet<String>, resolved: &str) {
    imported.insert(resolved.to_string());
    for ext in SOURCE_EXTENSIONS {
        imported.insert(format!("{resolved}.{ext}"));
        imported.insert(format!("{resolved}/index.{ext}"));
    }
}

/// Whether a file is reachable without imports: routing conventions,
/// config files, tests, declarations, auto-loaded directories.
fn is_entry_point(path: &str) -> bool {
    if AUTO_LOADED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.ends_with(".d.ts")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.contains(".stories.")
        || name.contains(".config.")
    {
        return true;
    }
    let base = name.split('.').next().unwrap_or(name);
    ENTRY_POINT_NAMES.contains(&base)
}

/// Source files never referenced by the import graph.
pub struct OrphanFilesRule;

impl OrphanFilesRule {
    fn imported_set(ctx: &RuleContext, files: &[String]) -> HashSet<String> {
        let mut imported = HashSet::new();
        for file in files {
            let Some(content) = ctx.read_file(file) else {
                continue;
            };
            for target in import_targets(&content) {
                if let Some(resolved) = resolve_relative(file, &target) {
                    register_variants(&mut imported, &resolved);
                }
            }
        }
        imported
    }
}

impl Rule for OrphanFilesRule {
    fn id(&self) -> &'static str {
        "dead/orphan-files"
    }
    fn name(&self) -> &'static str {
        "Orphan files"
    }
    fn category(&self) -> Category {
        Category::Dead
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Delete the file or import it from somewhere reachable."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Alias and absolute imports are not resolved, which over-reports orphans; the rule backs off when orphans exceed 30% of files.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NODE_AND_NEXT
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let files = ctx.source_files(SCAN_DEPTH);
        if files.is_empty() {
            return Ok(vec![]);
        }
        let imported = Self::imported_set(ctx, &files);

        let orphans: Vec<&String> = files
            .iter()
            .filter(|f| !imported.contains(*f) && !is_entry_point(f))
            .collect();
        if orphans.is_empty() {
            return Ok(vec![]);
        }

        let ratio = orphans.len() as f64 / files.len() as f64;
        if ratio > ORPHAN_RATIO_LIMIT {
            debug!(
                orphans = orphans.len(),
                files = files.len(),
                "orphan ratio above limit, assuming unresolved path aliases"
            );
            return Ok(vec![]);
        }

        Ok(orphans
            .into_iter()
            .take(MAX_ORPHANS)
            .map(|f| self.diagnostic(f, "File is never imported.".to_string()))
            .collect())
    }
}

/// Exported identifiers nothing references.
pub struct UnusedExportsRule;

impl UnusedExportsRule {
    /// Library manifests expose their exports on purpose.
    fn is_publishable_library(ctx: &RuleContext) -> bool {
        let Some(manifest) = ctx.read_json("package.json") else {
            return false;
        };
        ["main", "module", "exports", "types", "typings", "bin"]
            .iter()
            .any(|field| manifest.get(*field).is_some())
    }
}

impl Rule for UnusedExportsRule {
    fn id(&self) -> &'static str {
        "dead/unused-exports"
    }
    fn name(&self) -> &'static str {
        "Unused exports"
    }
    fn category(&self) -> Category {
        Category::Dead
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Remove the export keyword or delete the declaration."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("References are counted textually, so string mentions and shadowed names count as uses; false negatives are preferred over false positives.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NODE_AND_NEXT
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        if Self::is_publishable_library(ctx) {
            return Ok(vec![]);
        }
        let files = ctx.source_files(SCAN_DEPTH);
        if files.len() > EXPORT_SCAN_FILE_LIMIT {
            debug!(files = files.len(), "too many files for export analysis");
            return Ok(vec![]);
        }

        let mut corpus = String::new();
        let mut contents: Vec<(String, String)> = Vec::new();
        for file in files {
            if let Some(content) = ctx.read_file(&file) {
                corpus.push_str(&content);
                corpus.push('\n');
                contents.push((file, content));
            }
        }

        let mut diags = Vec::new();
        'files: for (file, content) in &contents {
            if is_entry_point(file) {
                continue;
            }
            for (idx, line) in content.lines().enumerate() {
                let Some(cap) = export_decl().captures(line) else {
                    continue;
                };
                let name = &cap[1];
                if RESERVED_EXPORT_NAMES.contains(&name) {
                    continue;
                }
                let word = Regex::new(&format!(r"\b{}\b", regex::escape(name)))?;
                let occurrences = word.find_iter(&corpus).take(2).count();
                if occurrences <= 1 {
                    let mut diag = self.diagnostic(
                        file,
                        format!("Export '{name}' is never referenced."),
                    );
                    diag.line = Some(idx as u32 + 1);
                    diags.push(diag);
                    if diags.len() >= MAX_UNUSED_EXPORTS {
                        break 'files;
                    }
                }
            }
        }
        Ok(diags)
    }
}

/// Component files never rendered or imported.
pub struct UnusedComponentsRule;

impl Rule for UnusedComponentsRule {
    fn id(&self) -> &'static str {
        "dead/unused-components"
    }
    fn name(&self) -> &'static str {
        "Unused components"
    }
    fn category(&self) -> Category {
        Category::Dead
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Delete the component or render it somewhere."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Components rendered only through dynamic() factories or spread tables are missed and reported as unused.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let files = ctx.source_files(SCAN_DEPTH);

        let mut corpus = String::new();
        for file in &files {
            if let Some(content) = ctx.read_file(file) {
                corpus.push_str(&content);
                corpus.push('\n');
            }
        }

        let mut diags = Vec::new();
        for file in &files {
            if diags.len() >= MAX_UNUSED_COMPONENTS {
                break;
            }
            if !file.ends_with(".tsx") && !file.ends_with(".jsx") {
                continue;
            }
            if is_entry_point(file) {
                continue;
            }
            let Some(stem) = Path::new(file).file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                continue;
            }

            let tag = Regex::new(&format!(r"<{}\b", regex::escape(stem)))?;
            let import = Regex::new(&format!(
                r"import\b[^;]*\b{}\b[^;]*from",
                regex::escape(stem)
            ))?;
            let references = tag.find_iter(&corpus).take(2).count()
                + import.find_iter(&corpus).take(2).count();
            if references <= 1 {
                diags.push(self.diagnostic(
                    file,
                    format!("Component '{stem}' is never rendered or imported."),
                ));
            }
        }
        Ok(diags)
    }
}
