//! Per-root file access for rules.
//!
//! Every rule sees the tree through a `RuleContext` bound to one scan
//! root: reads return `Option` instead of failing, walks skip the usual
//! junk directories, and paths are root-relative with forward slashes.
//! The engine builds a fresh context per (root, rule) pair, so rules
//! never share state through it.

use crate::models::{ProjectInfo, ProjectKind};
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Source file extensions the doctor inspects.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directories never walked, regardless of configuration. Dot-directories
/// (.git, .next, .turbo, ...) are skipped by the walker's hidden filter.
pub const IGNORED_DIRS: &[&str] = &["node_modules", "dist", "build", "out", "coverage"];

/// Read-only view of one scan root, plus the project snapshot.
pub struct RuleContext<'a> {
    root: PathBuf,
    /// Immutable detection snapshot for the whole project.
    pub project: &'a ProjectInfo,
    /// Resolved kind of this root, which is what rule applicability is
    /// matched against. For workspace roots this is the workspace's own
    /// kind, not the project's.
    pub root_kind: ProjectKind,
    extra_ignored: Vec<String>,
}

impl<'a> RuleContext<'a> {
    pub fn new(root: &Path, project: &'a ProjectInfo, root_kind: ProjectKind) -> Self {
        Self {
            root: root.to_path_buf(),
            project,
            root_kind,
            extra_ignored: Vec::new(),
        }
    }

    /// Additional directory names to skip during walks (from project
    /// config).
    pub fn with_ignored_dirs(mut self, dirs: Vec<String>) -> Self {
        self.extra_ignored = dirs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File content, or `None` on any I/O problem.
    pub fn read_file(&self, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(rel)).ok()
    }

    pub fn file_exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    /// Parsed JSON, or `None` when the file is missing or malformed.
    /// Malformed input is indistinguishable from absence on purpose.
    pub fn read_json(&self, rel: &str) -> Option<serde_json::Value> {
        let content = self.read_file(rel)?;
        serde_json::from_str(&content).ok()
    }

    /// Root-relative paths (forward slashes, sorted) of files whose path
    /// ends with `suffix`, walked at most `max_depth` directories deep
    /// (files directly in the root are at depth 1).
    pub fn find_files(&self, suffix: &str, max_depth: usize) -> Vec<String> {
        self.walk(max_depth)
            .into_iter()
            .filter(|p| p.ends_with(suffix))
            .collect()
    }

    /// All source files (by extension) up to `max_depth`, sorted.
    pub fn source_files(&self, max_depth: usize) -> Vec<String> {
        self.walk(max_depth)
            .into_iter()
            .filter(|p| {
                Path::new(p)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| SOURCE_EXTENSIONS.contains(&e))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Write a file under the root. Only fix routines call this.
    pub fn write_file(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating parent of {}", path.display()))?;
        }
        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn walk(&self, max_depth: usize) -> Vec<String> {
        let extra = self.extra_ignored.clone();
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .max_depth(Some(max_depth))
            .filter_entry(move |entry| {
                // The root entry itself is always kept, whatever its name.
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && (IGNORED_DIRS.contains(&name.as_ref()) || extra.iter().any(|d| d == name.as_ref())))
            });

        let mut files: Vec<String> = builder
            .build()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();
        files
    }
}
