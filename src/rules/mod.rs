//! Doctor rules
//!
//! Every check the doctor runs lives here. A rule is a stateless
//! [`Rule`] implementation that inspects one scan root through a
//! [`RuleContext`] and reports [`Diagnostic`]s; the [`DoctorEngine`]
//! decides which rules run where and aggregates what they find.
//!
//! Rules are grouped by category:
//! - `framework`: Next.js conventions (client directives, routing)
//! - `monorepo`: workspace manifest consistency
//! - `hygiene`: lockfiles, ignore files, TypeScript strictness
//! - `dead_code`: orphan files, unused exports and components
//!
//! [`Diagnostic`]: crate::models::Diagnostic

// Rule infrastructure
pub mod base;
pub mod context;
pub mod engine;

// Rule implementations by category
pub mod dead_code;
pub mod framework;
pub mod hygiene;
pub mod monorepo;

// Re-export base types
pub use base::{Rule, RuleOutcome};
pub use context::{RuleContext, IGNORED_DIRS, SOURCE_EXTENSIONS};
pub use engine::{DoctorEngine, ScanOptions};

// Re-export rules by category
pub use dead_code::{OrphanFilesRule, UnusedComponentsRule, UnusedExportsRule};
pub use framework::{
    MixedRoutersRule, NoAnchorNavRule, NoImgElementRule, ServerEnvInClientRule, UseClientRule,
};
pub use hygiene::{EnvNotIgnoredRule, GitignoreRule, OneLockfileRule, TsStrictRule};
pub use monorepo::{
    ConsistentVersionsRule, EmptyGlobsRule, RootDepsRule, RootPrivateRule, WorkspaceManifestsRule,
};

use std::sync::Arc;

/// The full rule registry, in report order.
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // Framework rules
        Arc::new(UseClientRule),
        Arc::new(NoImgElementRule),
        Arc::new(NoAnchorNavRule),
        Arc::new(ServerEnvInClientRule),
        Arc::new(MixedRoutersRule),
        // Monorepo rules
        Arc::new(WorkspaceManifestsRule),
        Arc::new(ConsistentVersionsRule),
        Arc::new(RootDepsRule),
        Arc::new(EmptyGlobsRule),
        Arc::new(RootPrivateRule),
        // Hygiene rules
        Arc::new(OneLockfileRule),
        Arc::new(GitignoreRule),
        Arc::new(EnvNotIgnoredRule),
        Arc::new(TsStrictRule),
        // Dead code rules
        Arc::new(OrphanFilesRule),
        Arc::new(UnusedExportsRule),
        Arc::new(UnusedComponentsRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_ids_are_unique_and_category_prefixed() {
        let rules = default_rules();
        assert_eq!(rules.len(), 17);
        let mut seen = HashSet::new();
        for rule in &rules {
            assert!(seen.insert(rule.id()), "duplicate rule id {}", rule.id());
            let prefix = rule.id().split('/').next().unwrap();
            assert_eq!(prefix, rule.category().to_string());
            assert!(!rule.applies_to().is_empty());
        }
    }
}
