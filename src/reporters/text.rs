//! Text (terminal) reporter with colors and formatting

use crate::models::{Category, DoctorResult, Severity};
use anyhow::Result;
use console::style;

/// Render a result as a grouped terminal report.
pub fn render(result: &DoctorResult) -> Result<String> {
    let mut out = String::new();
    let project = &result.project;

    out.push_str(&format!("{}\n", style("Repomedic Checkup").bold()));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));
    out.push_str(&format!(
        "{} ({}, {})",
        style(&project.name).bold(),
        project.kind,
        project.package_manager
    ));
    if project.is_monorepo {
        out.push_str(&format!(", {} workspaces", project.workspaces.len()));
    }
    out.push('\n');
    out.push_str(&format!(
        "Score: {}/100  Grade: {}\n",
        style(result.score).bold(),
        grade_styled(&result.grade)
    ));

    for category in Category::ALL {
        let rules: Vec<_> = result
            .rule_results
            .iter()
            .filter(|r| r.category == category)
            .collect();
        if rules.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "\n{}\n",
            style(category.to_string().to_uppercase()).bold()
        ));
        for rule in rules {
            if rule.passed {
                out.push_str(&format!("  {} {}\n", style("✓").green(), rule.rule_name));
                continue;
            }
            out.push_str(&format!(
                "  {} {} ({})\n",
                style("✗").red(),
                rule.rule_name,
                rule.diagnostics.len()
            ));
            for diag in &rule.diagnostics {
                let location = match diag.line {
                    Some(line) => format!("{}:{}", diag.file_path, line),
                    None => diag.file_path.clone(),
                };
                let marker = match diag.severity {
                    Severity::Error => style("error").red(),
                    Severity::Warning => style("warning").yellow(),
                };
                out.push_str(&format!(
                    "      {} {}  {}\n",
                    marker,
                    style(location).dim(),
                    diag.message
                ));
                if !diag.help.is_empty() {
                    out.push_str(&format!("        {}\n", style(&diag.help).dim()));
                }
            }
        }
    }

    out.push('\n');
    let summary = &result.summary;
    if summary.total == 0 {
        out.push_str(&format!("{}\n", style("No problems found.").green()));
    } else {
        let mut parts = Vec::new();
        if summary.errors > 0 {
            parts.push(format!("{}", style(count(summary.errors, "error")).red()));
        }
        if summary.warnings > 0 {
            parts.push(format!(
                "{}",
                style(count(summary.warnings, "warning")).yellow()
            ));
        }
        out.push_str(&parts.join(", "));
        if summary.auto_fixable > 0 {
            out.push_str(&format!(" ({} auto-fixable)", summary.auto_fixable));
        }
        out.push('\n');

        match result.fixed_count {
            Some(fixed) => {
                out.push_str(&format!(
                    "{} Applied {}\n",
                    style("✓").green(),
                    count(fixed, "fix")
                ));
            }
            None if summary.auto_fixable > 0 => {
                out.push_str(&format!(
                    "{}\n",
                    style(format!(
                        "Run with --fix to repair {} automatically",
                        count(summary.auto_fixable, "issue")
                    ))
                    .dim()
                ));
            }
            None => {}
        }
    }

    Ok(out)
}

fn grade_styled(grade: &str) -> String {
    let styled = match grade.chars().next() {
        Some('A') => style(grade).green(),
        Some('B') => style(grade).green(),
        Some('C') => style(grade).yellow(),
        Some('D') => style(grade).yellow(),
        _ => style(grade).red(),
    };
    format!("{}", styled.bold())
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else if noun == "fix" {
        format!("{n} {noun}es")
    } else {
        format!("{n} {noun}s")
    }
}
