//! End-to-end scans through the library API
//!
//! Each test builds a throwaway project tree, runs the full pipeline
//! (detect -> engine -> default registry) and asserts on the aggregated
//! result: diagnostics, score, grade, and fix behavior. The compiled
//! binary is exercised separately in cli_test.rs.

use repomedic::detect::detect_project;
use repomedic::models::{Category, Diagnostic, DoctorResult, ProjectKind, Severity};
use repomedic::rules::{default_rules, DoctorEngine, Rule, RuleContext, ScanOptions};
use std::path::Path;
use std::sync::Arc;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("fixture directory should be creatable");
    }
    std::fs::write(path, content).expect("fixture file should be writable");
}

fn scan(root: &Path) -> DoctorResult {
    scan_with(root, ScanOptions::default())
}

fn scan_with(root: &Path, options: ScanOptions) -> DoctorResult {
    let project = detect_project(root).expect("fixture root should be readable");
    let mut engine = DoctorEngine::new(2);
    engine.register_all(default_rules());
    engine.run(&project, &options).expect("scan should complete")
}

fn by_rule<'a>(result: &'a DoctorResult, rule_id: &str) -> Vec<&'a Diagnostic> {
    result
        .diagnostics
        .iter()
        .filter(|d| d.rule_id == rule_id)
        .collect()
}

/// Monorepo with two workspaces; packages/lib declares an export `foo`
/// that nothing references.
fn monorepo_fixture(root: &Path) {
    write(
        root,
        "package.json",
        r#"{"name": "mono", "private": true, "workspaces": ["packages/*"]}"#,
    );
    write(root, ".gitignore", "node_modules/\n");
    write(root, "packages/app/package.json", r#"{"name": "@mono/app"}"#);
    write(
        root,
        "packages/app/src/index.ts",
        "const boot = () => {};\nboot();\n",
    );
    write(root, "packages/lib/package.json", r#"{"name": "@mono/lib"}"#);
    write(
        root,
        "packages/lib/src/index.ts",
        "import { bar } from './helpers';\nconsole.log(bar);\n",
    );
    write(
        root,
        "packages/lib/src/helpers.ts",
        "export const foo = 1;\nexport const bar = 2;\n",
    );
}

// ============================================================================
// Scoring and aggregation
// ============================================================================

#[test]
fn test_clean_project_scores_100() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "clean", "version": "1.0.0", "main": "index.js"}"#,
    );
    write(dir.path(), "pnpm-lock.yaml", "lockfileVersion: 9\n");
    write(dir.path(), ".gitignore", "node_modules/\n.env*\n");
    write(
        dir.path(),
        "tsconfig.json",
        r#"{"compilerOptions": {"strict": true}}"#,
    );
    write(
        dir.path(),
        "src/index.ts",
        "import { greet } from './greet';\n\nconsole.log(greet('doc'));\n",
    );
    write(
        dir.path(),
        "src/greet.ts",
        "export const greet = (name: string) => `hi ${name}`;\n",
    );

    let result = scan(dir.path());

    assert_eq!(
        result.summary.total, 0,
        "clean tree should yield no diagnostics, got {:?}",
        result.diagnostics
    );
    assert_eq!(result.score, 100);
    assert_eq!(result.grade, "A+");
    assert!(result.fixed_count.is_none(), "no fix phase was requested");
    assert!(
        result.rule_results.iter().all(|r| r.passed),
        "every rule should pass on a clean tree"
    );
    // Next.js and monorepo rules never matched this root's kind, so they
    // do not appear in the results at all.
    assert!(result
        .rule_results
        .iter()
        .all(|r| r.category != Category::Framework && r.category != Category::Monorepo));
}

#[test]
fn test_warnings_only_project_scores_94_grade_a() {
    let dir = tempfile::tempdir().unwrap();
    // Three warnings, zero errors: no .gitignore, strict mode off, and
    // one orphan file. "main" keeps the unused-export rule out of the way.
    write(
        dir.path(),
        "package.json",
        r#"{"name": "warned", "version": "0.1.0", "main": "index.js"}"#,
    );
    write(
        dir.path(),
        "tsconfig.json",
        r#"{"compilerOptions": {"strict": false}}"#,
    );
    write(
        dir.path(),
        "src/index.ts",
        "import { a } from './a';\nimport { b } from './b';\nconsole.log(a, b);\n",
    );
    write(dir.path(), "src/a.ts", "export const a = 1;\n");
    write(dir.path(), "src/b.ts", "export const b = 2;\n");
    write(
        dir.path(),
        "src/legacy.ts",
        "const old = 1;\nconsole.log(old);\n",
    );

    let result = scan(dir.path());

    assert_eq!(result.summary.errors, 0, "got {:?}", result.diagnostics);
    assert_eq!(result.summary.warnings, 3, "got {:?}", result.diagnostics);
    assert_eq!(result.score, 94);
    assert_eq!(result.grade, "A", "94 sits in the second-highest band");
    assert_eq!(by_rule(&result, "hygiene/gitignore").len(), 1);
    assert_eq!(by_rule(&result, "hygiene/ts-strict").len(), 1);
    assert_eq!(by_rule(&result, "dead/orphan-files").len(), 1);
}

// ============================================================================
// Lockfile hygiene
// ============================================================================

#[test]
fn test_two_lockfiles_yield_one_fixable_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "lockdemo", "version": "1.0.0"}"#,
    );
    write(dir.path(), ".gitignore", "node_modules/\n");
    write(dir.path(), "yarn.lock", "");
    write(dir.path(), "package-lock.json", "{}");

    let result = scan(dir.path());

    let lockfile = by_rule(&result, "hygiene/one-lockfile");
    assert_eq!(
        lockfile.len(),
        1,
        "exactly one multiple-lockfile diagnostic, got {:?}",
        result.diagnostics
    );
    assert!(
        lockfile[0].message.contains("yarn.lock")
            && lockfile[0].message.contains("package-lock.json"),
        "message should name both lockfiles: {}",
        lockfile[0].message
    );
    assert_eq!(lockfile[0].severity, Severity::Error);
    assert!(lockfile[0].auto_fixable);

    // Nothing else is wrong with this tree.
    assert_eq!(result.summary.total, 1);
    assert_eq!(result.score, 95);
    assert_eq!(result.grade, "A+");
}

// ============================================================================
// Monorepos
// ============================================================================

#[test]
fn test_monorepo_unused_export_path_is_project_relative() {
    let dir = tempfile::tempdir().unwrap();
    monorepo_fixture(dir.path());

    let result = scan(dir.path());
    assert!(result.project.is_monorepo);
    assert_eq!(result.project.workspaces.len(), 2);

    let unused = by_rule(&result, "dead/unused-exports");
    assert_eq!(
        unused.len(),
        1,
        "one unused export expected, got {:?}",
        result.diagnostics
    );
    assert_eq!(
        unused[0].file_path, "packages/lib/src/helpers.ts",
        "path must be relative to the monorepo root, not the workspace"
    );
    assert_eq!(unused[0].line, Some(1));
    assert!(unused[0].message.contains("'foo'"), "{}", unused[0].message);

    // Hygiene rules also ran inside each workspace; their paths carry
    // the workspace prefix too.
    let gitignore = by_rule(&result, "hygiene/gitignore");
    let mut paths: Vec<&str> = gitignore.iter().map(|d| d.file_path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        vec!["packages/app/.gitignore", "packages/lib/.gitignore"]
    );

    assert!(by_rule(&result, "dead/orphan-files").is_empty());
    for rr in &result.rule_results {
        assert_eq!(
            rr.passed,
            rr.diagnostics.is_empty(),
            "passed must mirror diagnostics for {}",
            rr.rule_id
        );
    }
    let expected =
        (100i64 - 5 * result.summary.errors as i64 - 2 * result.summary.warnings as i64).max(0);
    assert_eq!(result.score as i64, expected);
}

#[test]
fn test_workspace_filter_limits_scanned_workspaces() {
    let dir = tempfile::tempdir().unwrap();
    monorepo_fixture(dir.path());

    let options = ScanOptions {
        workspace: Some("app".to_string()),
        ..Default::default()
    };
    let result = scan_with(dir.path(), options);

    assert!(
        result
            .diagnostics
            .iter()
            .all(|d| !d.file_path.starts_with("packages/lib")),
        "filtered-out workspace must contribute nothing, got {:?}",
        result.diagnostics
    );
    // packages/app still gets its own gitignore warning.
    assert_eq!(result.summary.total, 1);
    assert_eq!(
        result.diagnostics[0].file_path,
        "packages/app/.gitignore"
    );
}

// ============================================================================
// Dead code
// ============================================================================

#[test]
fn test_routing_convention_files_are_never_orphans() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "router", "version": "1.0.0", "main": "index.js"}"#,
    );
    write(dir.path(), ".gitignore", "node_modules/\n");
    write(
        dir.path(),
        "src/index.ts",
        "import { a } from './a';\nimport { b } from './b';\nconsole.log(a, b);\n",
    );
    write(dir.path(), "src/a.ts", "export const a = 1;\n");
    write(dir.path(), "src/b.ts", "export const b = 2;\n");
    // Loaded by the framework, never imported: not an orphan.
    write(
        dir.path(),
        "middleware.ts",
        "const matcher = ['/api'];\nconsole.log(matcher);\n",
    );
    // Imported by nothing and not an entry point: a real orphan.
    write(
        dir.path(),
        "src/stray.ts",
        "const s = 1;\nconsole.log(s);\n",
    );

    let result = scan(dir.path());

    let orphans = by_rule(&result, "dead/orphan-files");
    assert_eq!(orphans.len(), 1, "got {:?}", result.diagnostics);
    assert_eq!(orphans[0].file_path, "src/stray.ts");
    assert!(
        orphans.iter().all(|d| d.file_path != "middleware.ts"),
        "routing-convention file must not be flagged"
    );
}

// ============================================================================
// Determinism and fixes
// ============================================================================

#[test]
fn test_rescan_of_unchanged_tree_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    monorepo_fixture(dir.path());

    let first = scan(dir.path());
    let second = scan(dir.path());

    assert_eq!(
        serde_json::to_string(&first.diagnostics).unwrap(),
        serde_json::to_string(&second.diagnostics).unwrap(),
        "diagnostics must serialize identically across reruns"
    );
    assert_eq!(
        serde_json::to_string(&first.rule_results).unwrap(),
        serde_json::to_string(&second.rule_results).unwrap()
    );
    assert_eq!(first.score, second.score);
    assert_eq!(first.grade, second.grade);
}

#[test]
fn test_fix_applies_once_then_nothing_remains_to_fix() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "fixit", "version": "1.0.0"}"#,
    );
    write(dir.path(), "pnpm-lock.yaml", "lockfileVersion: 9\n");
    write(dir.path(), "package-lock.json", "{}");
    write(dir.path(), ".env", "TOKEN=secret\n");

    let options = ScanOptions {
        fix: true,
        ..Default::default()
    };
    let first = scan_with(dir.path(), options.clone());

    // Pre-fix findings: extra lockfile (error), no .gitignore (warning),
    // unignored .env (error).
    assert_eq!(first.summary.errors, 2, "got {:?}", first.diagnostics);
    assert_eq!(first.summary.warnings, 1);
    assert_eq!(first.summary.auto_fixable, 3);
    assert_eq!(first.score, 88);
    assert_eq!(first.fixed_count, Some(3));

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    for line in ["package-lock.json", "node_modules/", ".env*"] {
        assert!(
            gitignore.lines().any(|l| l == line),
            ".gitignore should contain '{line}' after fixing:\n{gitignore}"
        );
    }

    // Second pass: the surplus lockfile is still on disk (fixes never
    // delete files) but everything fixable has been fixed.
    let second = scan_with(dir.path(), options);
    assert_eq!(second.fixed_count, Some(0), "second fix pass must be a no-op");
    assert_eq!(second.summary.total, 1);
    assert_eq!(second.diagnostics[0].rule_id, "hygiene/one-lockfile");
    let unchanged = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore, unchanged, ".gitignore must not grow on rescan");
}

// ============================================================================
// Fault isolation
// ============================================================================

struct ExplodingRule;

impl Rule for ExplodingRule {
    fn id(&self) -> &'static str {
        "hygiene/exploding"
    }
    fn name(&self) -> &'static str {
        "Exploding"
    }
    fn category(&self) -> Category {
        Category::Hygiene
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "This rule always panics."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        &[ProjectKind::Node, ProjectKind::Next, ProjectKind::Monorepo]
    }
    fn check(&self, _ctx: &RuleContext) -> anyhow::Result<Vec<Diagnostic>> {
        panic!("exploding rule detonated");
    }
}

#[test]
fn test_a_faulty_rule_does_not_disturb_other_results() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "faulty", "version": "1.0.0"}"#,
    );
    write(dir.path(), ".gitignore", "node_modules/\n");
    write(dir.path(), "yarn.lock", "");
    write(dir.path(), "package-lock.json", "{}");
    let project = detect_project(dir.path()).unwrap();

    let mut plain = DoctorEngine::new(1);
    plain.register_all(default_rules());
    let baseline = plain.run(&project, &ScanOptions::default()).unwrap();

    let mut faulty = DoctorEngine::new(1);
    faulty.register_all(default_rules());
    faulty.register(Arc::new(ExplodingRule));
    let result = faulty.run(&project, &ScanOptions::default()).unwrap();

    assert_eq!(result.score, baseline.score);
    assert_eq!(result.summary.total, baseline.summary.total);
    assert_eq!(result.rule_results.len(), baseline.rule_results.len() + 1);

    let exploded = result
        .rule_results
        .iter()
        .find(|r| r.rule_id == "hygiene/exploding")
        .expect("faulty rule still appears in the results");
    assert!(
        exploded.passed,
        "a crashed rule reads as passed with no findings"
    );
    assert!(exploded.diagnostics.is_empty());
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_category_filter_restricts_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "filtered", "version": "1.0.0"}"#,
    );
    write(dir.path(), ".gitignore", "node_modules/\n");
    write(dir.path(), "yarn.lock", "");
    write(dir.path(), "package-lock.json", "{}");

    let options = ScanOptions {
        category: Some(Category::Dead),
        ..Default::default()
    };
    let result = scan_with(dir.path(), options);

    assert!(
        result
            .rule_results
            .iter()
            .all(|r| r.category == Category::Dead),
        "only dead-code rules should have run"
    );
    // The lockfile error is a hygiene finding; with the filter on it
    // must not surface.
    assert!(by_rule(&result, "hygiene/one-lockfile").is_empty());
    assert_eq!(result.score, 100);
}
