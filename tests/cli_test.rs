//! CLI behavior tests
//!
//! These run the compiled binary against throwaway project trees and
//! assert on stdout, stderr, and exit codes. Log lines may precede the
//! JSON payload on stdout, so JSON is extracted rather than parsed
//! wholesale.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run the binary as `repomedic <dir> [args...]` and collect
/// (stdout, stderr, exit code).
fn repomedic(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repomedic"));
    cmd.arg(dir.to_str().unwrap());
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    let output = cmd.output().expect("repomedic binary should run");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn extract_json(output: &str) -> serde_json::Value {
    let start = output.find('{').expect("output should contain JSON");
    let end = output.rfind('}').expect("output should contain JSON");
    serde_json::from_str(&output[start..=end]).unwrap_or_else(|e| {
        panic!(
            "extracted JSON should parse: {e}. Output: {}",
            &output[..output.len().min(500)]
        )
    })
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("fixture directory should be creatable");
    }
    std::fs::write(path, content).expect("fixture file should be writable");
}

/// A project whose only problem is a second lockfile: one auto-fixable
/// error, score 95.
fn lockfile_fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "package.json",
        r#"{"name": "cli-demo", "version": "1.0.0"}"#,
    );
    write(dir.path(), ".gitignore", "node_modules/\n");
    write(dir.path(), "yarn.lock", "");
    write(dir.path(), "package-lock.json", "{}");
    dir
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_scan_with_findings_exits_zero() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--json"]);

    // Findings are data, not process failure.
    assert_eq!(code, 0, "stderr: {stderr}");
    let report = extract_json(&stdout);
    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert!(!diagnostics.is_empty(), "expected at least one finding");
}

#[test]
fn test_unreadable_root_fails() {
    let (_stdout, stderr, code) =
        repomedic(Path::new("/no/such/repomedic/root"), &["--json"]);
    assert_ne!(code, 0, "a missing root is the one hard failure");
    assert!(
        stderr.contains("not readable"),
        "stderr should explain the failure: {stderr}"
    );
}

#[test]
fn test_conflicting_output_flags_are_rejected() {
    let dir = lockfile_fixture();
    let (_stdout, stderr, code) = repomedic(dir.path(), &["--json", "--score"]);
    assert_ne!(code, 0);
    assert!(
        stderr.contains("cannot be used with"),
        "clap should report the conflict: {stderr}"
    );
}

// ============================================================================
// Output formats
// ============================================================================

#[test]
fn test_json_report_shape() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--json"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let report = extract_json(&stdout);
    assert_eq!(report["score"], 95);
    assert_eq!(report["grade"], "A+");
    assert_eq!(report["project"]["name"], "cli-demo");
    assert_eq!(report["summary"]["errors"], 1);
    assert_eq!(report["summary"]["total"], 1);
    assert!(report["fixed_count"].is_null(), "no fix phase requested");
    assert!(report["rule_results"].is_array());

    let diag = &report["diagnostics"][0];
    assert_eq!(diag["rule_id"], "hygiene/one-lockfile");
    assert_eq!(diag["severity"], "error");
    assert_eq!(diag["auto_fixable"], true);
    assert!(diag["message"].as_str().unwrap().contains("yarn.lock"));
    assert!(diag["help"].is_string());
}

#[test]
fn test_score_output_is_a_bare_integer() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--score"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout.trim(), "95", "got: {stdout:?}");
}

#[test]
fn test_text_report_shows_score_and_failed_rule() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &[]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Score: 95/100"), "got: {stdout}");
    assert!(stdout.contains("A+"), "got: {stdout}");
    assert!(
        stdout.contains("Multiple lockfiles found"),
        "the failing rule's message should be shown: {stdout}"
    );
}

// ============================================================================
// Dry run and fix
// ============================================================================

#[test]
fn test_dry_run_lists_fixes_without_writing() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--dry-run"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(
        stdout.contains("Dry run: --fix would repair:"),
        "got: {stdout}"
    );
    assert!(stdout.contains("package-lock.json"), "got: {stdout}");

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore, "node_modules/\n", "dry run must not write");
}

#[test]
fn test_fix_writes_and_reports_the_count() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--fix"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Applied 1 fix"), "got: {stdout}");

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(
        gitignore.lines().any(|l| l == "package-lock.json"),
        "the surplus lockfile should now be ignored:\n{gitignore}"
    );
}

// ============================================================================
// Subcommands
// ============================================================================

#[test]
fn test_rules_subcommand_lists_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = repomedic(dir.path(), &["rules"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    for id in [
        "hygiene/one-lockfile",
        "dead/orphan-files",
        "framework/use-client-directive",
        "monorepo/root-private",
    ] {
        assert!(stdout.contains(id), "rule listing should include {id}");
    }
    assert!(stdout.contains("applies to:"), "got: {stdout}");
}

#[test]
fn test_init_writes_a_starter_config() {
    let dir = tempfile::tempdir().unwrap();
    let (_stdout, stderr, code) = repomedic(dir.path(), &["init"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let config = std::fs::read_to_string(dir.path().join("repomedic.toml")).unwrap();
    assert!(config.contains("[rules]"));
    assert!(config.contains("disable = []"));
    assert!(config.contains("[exclude]"));
}

#[test]
fn test_version_subcommand_prints_the_version() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _stderr, code) = repomedic(dir.path(), &["version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "got: {stdout}");
    assert!(stdout.contains("repomedic"));
}

// ============================================================================
// Category filter through the CLI
// ============================================================================

#[test]
fn test_category_filter_flag() {
    let dir = lockfile_fixture();
    let (stdout, stderr, code) = repomedic(dir.path(), &["--category", "dead", "--json"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let report = extract_json(&stdout);
    assert_eq!(
        report["score"], 100,
        "the lockfile error is hygiene, not dead code"
    );
    for rr in report["rule_results"].as_array().unwrap() {
        assert_eq!(rr["category"], "dead", "got: {rr}");
    }
}

#[test]
fn test_unknown_category_is_rejected() {
    let dir = lockfile_fixture();
    let (_stdout, stderr, code) = repomedic(dir.path(), &["--category", "quality"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown category"), "got: {stderr}");
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn test_verbose_defers_to_explicit_rust_log() {
    let dir = lockfile_fixture();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repomedic"));
    cmd.arg(dir.path().to_str().unwrap());
    cmd.args(["--verbose", "--json"]);
    cmd.env("RUST_LOG", "off");
    let output = cmd.output().expect("repomedic binary should run");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert_eq!(output.status.code().unwrap_or(-1), 0);
    assert!(
        !stdout.contains("DEBUG"),
        "RUST_LOG=off should silence --verbose: {stdout}"
    );
    assert_eq!(extract_json(&stdout)["score"], 95);

    // With RUST_LOG unset, --verbose raises the filter to debug.
    let (stdout, stderr, code) = repomedic(dir.path(), &["--verbose"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("DEBUG"), "got: {stdout}");
    assert!(stdout.contains("Score: 95/100"), "got: {stdout}");
}
