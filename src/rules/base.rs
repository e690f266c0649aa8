//! Base rule trait and types
//!
//! This module defines the core abstractions for project checks:
//! - `Rule` trait that all checks implement
//! - `RuleOutcome` for capturing a single execution

use crate::models::{Category, Diagnostic, ProjectKind, Severity};
use crate::rules::context::RuleContext;
use anyhow::Result;

/// Trait for all doctor rules
///
/// A rule inspects one scan root through its [`RuleContext`] and reports
/// zero or more diagnostics. Rules hold no state and never see each
/// other's output; the engine decides where each rule runs and how its
/// diagnostics are aggregated.
pub trait Rule: Send + Sync {
    /// Stable identifier, `category/slug` (e.g. "hygiene/one-lockfile").
    /// Appears in reports and in config `disable` lists.
    fn id(&self) -> &'static str;

    /// Short human-readable name for report headings.
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Severity of every diagnostic this rule emits.
    fn severity(&self) -> Severity;

    /// One-line remediation hint attached to each diagnostic.
    fn help(&self) -> &'static str;

    /// Known bias of the heuristic, shown by `repomedic rules`.
    fn bias(&self) -> Option<&'static str> {
        None
    }

    /// Project kinds this rule runs on. The engine skips the rule
    /// entirely for roots of any other kind.
    fn applies_to(&self) -> &'static [ProjectKind];

    /// Inspect the root and report problems. Must not write anything.
    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>>;

    /// Apply an auto-fix for one of this rule's diagnostics. Returns
    /// `Ok(true)` when something was changed. The default does nothing;
    /// rules that mark diagnostics `auto_fixable` override it.
    ///
    /// Fixes may create or modify files but never delete them, and must
    /// be idempotent: fixing an already-fixed tree changes nothing.
    fn fix(&self, ctx: &RuleContext, diagnostic: &Diagnostic) -> Result<bool> {
        let _ = (ctx, diagnostic);
        Ok(false)
    }

    /// Diagnostic pre-filled with this rule's id, severity, and help.
    /// `file_path` is relative to the context root.
    fn diagnostic(&self, file_path: &str, message: String) -> Diagnostic
    where
        Self: Sized,
    {
        Diagnostic {
            rule_id: self.id().to_string(),
            file_path: file_path.to_string(),
            line: None,
            severity: self.severity(),
            message,
            help: self.help().to_string(),
            auto_fixable: false,
        }
    }
}

/// Result of running a single rule against a single root.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub diagnostics: Vec<Diagnostic>,
    pub duration_ms: u64,
    /// False when the rule returned an error or panicked. A faulted rule
    /// contributes no diagnostics and the scan continues.
    pub success: bool,
    pub error: Option<String>,
}

impl RuleOutcome {
    pub fn success(rule_id: String, diagnostics: Vec<Diagnostic>, duration_ms: u64) -> Self {
        Self {
            rule_id,
            diagnostics,
            duration_ms,
            success: true,
            error: None,
        }
    }

    pub fn failure(rule_id: String, error: String, duration_ms: u64) -> Self {
        Self {
            rule_id,
            diagnostics: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}
