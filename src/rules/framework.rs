//! Next.js convention rules
//!
//! Line-oriented checks for App Router projects: missing 'use client'
//! directives, raw <img> and <a> usage, server env vars leaking into
//! client components, and app/pages router mixing. No AST is built;
//! every check is a bounded pattern scan.

use crate::models::{Category, Diagnostic, ProjectKind, Severity};
use crate::rules::base::Rule;
use crate::rules::context::RuleContext;
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const NEXT_ONLY: &[ProjectKind] = &[ProjectKind::Next];

/// Walk depth for source scans.
const SCAN_DEPTH: usize = 8;

static HOOK_CALL: OnceLock<Regex> = OnceLock::new();
static EVENT_HANDLER: OnceLock<Regex> = OnceLock::new();
static IMG_TAG: OnceLock<Regex> = OnceLock::new();
static ANCHOR_NAV: OnceLock<Regex> = OnceLock::new();
static ENV_ACCESS: OnceLock<Regex> = OnceLock::new();

fn hook_call() -> &'static Regex {
    HOOK_CALL.get_or_init(|| {
        Regex::new(
            r"\buse(State|Effect|LayoutEffect|Reducer|Ref|Callback|Memo|Context|Transition|DeferredValue|Id|SyncExternalStore)\s*\(",
        )
        .unwrap()
    })
}

fn event_handler() -> &'static Regex {
    EVENT_HANDLER.get_or_init(|| {
        Regex::new(r"\bon(Click|Change|Submit|Input|KeyDown|KeyUp|Focus|Blur|MouseEnter|MouseLeave)\s*=\s*\{").unwrap()
    })
}

fn img_tag() -> &'static Regex {
    IMG_TAG.get_or_init(|| Regex::new(r"<img[\s/>]").unwrap())
}

fn anchor_nav() -> &'static Regex {
    ANCHOR_NAV.get_or_init(|| Regex::new(r#"<a\s[^>]*href=["']/"#).unwrap())
}

fn env_access() -> &'static Regex {
    ENV_ACCESS.get_or_init(|| Regex::new(r"process\.env\.([A-Z][A-Z0-9_]*)").unwrap())
}

/// True when the first meaningful line is a 'use client' directive.
/// Leading blank lines and line comments are skipped; block comments
/// before the directive are not recognized.
fn has_use_client(content: &str) -> bool {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        return trimmed.starts_with("'use client'") || trimmed.starts_with("\"use client\"");
    }
    false
}

/// 1-based line of the first match of `re` in `content`.
fn first_match_line(re: &Regex, content: &str) -> Option<u32> {
    content
        .lines()
        .position(|line| re.is_match(line))
        .map(|idx| idx as u32 + 1)
}

/// Component files (.jsx/.tsx) under the App Router directory.
fn app_component_files(ctx: &RuleContext) -> Vec<String> {
    ctx.source_files(SCAN_DEPTH)
        .into_iter()
        .filter(|p| p.starts_with("app/") || p.starts_with("src/app/"))
        .filter(|p| p.ends_with(".tsx") || p.ends_with(".jsx"))
        .collect()
}

/// Component files (.jsx/.tsx) anywhere in the root.
fn component_files(ctx: &RuleContext) -> Vec<String> {
    ctx.source_files(SCAN_DEPTH)
        .into_iter()
        .filter(|p| p.ends_with(".tsx") || p.ends_with(".jsx"))
        .collect()
}

/// App Router component using client-only React APIs without the
/// 'use client' directive.
pub struct UseClientRule;

impl Rule for UseClientRule {
    fn id(&self) -> &'static str {
        "framework/use-client-directive"
    }
    fn name(&self) -> &'static str {
        "Missing 'use client' directive"
    }
    fn category(&self) -> Category {
        Category::Framework
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn help(&self) -> &'static str {
        "Add 'use client' as the first line, or move the interactive logic into a client component."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Hooks reached only through a client-side import chain do not strictly need the directive; those files are still flagged.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let mut diags = Vec::new();
        for file in app_component_files(ctx) {
            let Some(content) = ctx.read_file(&file) else {
                continue;
            };
            if has_use_client(&content) {
                continue;
            }
            let line = first_match_line(hook_call(), &content)
                .or_else(|| first_match_line(event_handler(), &content));
            if let Some(line) = line {
                let mut diag = self.diagnostic(
                    &file,
                    "Client-only React APIs used without a 'use client' directive.".to_string(),
                );
                diag.line = Some(line);
                diag.auto_fixable = true;
                diags.push(diag);
            }
        }
        Ok(diags)
    }

    fn fix(&self, ctx: &RuleContext, diagnostic: &Diagnostic) -> Result<bool> {
        let Some(content) = ctx.read_file(&diagnostic.file_path) else {
            return Ok(false);
        };
        if has_use_client(&content) {
            return Ok(false);
        }
        let updated = format!("'use client';\n\n{content}");
        ctx.write_file(&diagnostic.file_path, &updated)?;
        Ok(true)
    }
}

/// Raw <img> where next/image is available.
pub struct NoImgElementRule;

impl Rule for NoImgElementRule {
    fn id(&self) -> &'static str {
        "framework/no-img-element"
    }
    fn name(&self) -> &'static str {
        "Prefer next/image"
    }
    fn category(&self) -> Category {
        Category::Framework
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Use the Image component from next/image for automatic sizing and lazy loading."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let mut diags = Vec::new();
        for file in component_files(ctx) {
            let Some(content) = ctx.read_file(&file) else {
                continue;
            };
            if content.contains("next/image") {
                continue;
            }
            if let Some(line) = first_match_line(img_tag(), &content) {
                let mut diag = self.diagnostic(
                    &file,
                    "Raw <img> element used instead of next/image.".to_string(),
                );
                diag.line = Some(line);
                diags.push(diag);
            }
        }
        Ok(diags)
    }
}

/// Internal navigation through a raw anchor instead of next/link.
pub struct NoAnchorNavRule;

impl Rule for NoAnchorNavRule {
    fn id(&self) -> &'static str {
        "framework/no-anchor-nav"
    }
    fn name(&self) -> &'static str {
        "Prefer next/link"
    }
    fn category(&self) -> Category {
        Category::Framework
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Use the Link component from next/link for internal routes to keep client-side navigation."
    }
    fn bias(&self) -> Option<&'static str> {
        Some("Only string-literal hrefs starting with '/' are recognized; template-literal hrefs are missed.")
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let mut diags = Vec::new();
        for file in component_files(ctx) {
            let Some(content) = ctx.read_file(&file) else {
                continue;
            };
            if content.contains("next/link") {
                continue;
            }
            if let Some(line) = first_match_line(anchor_nav(), &content) {
                let mut diag = self.diagnostic(
                    &file,
                    "Internal route navigated with a raw <a> element.".to_string(),
                );
                diag.line = Some(line);
                diags.push(diag);
            }
        }
        Ok(diags)
    }
}

/// Server-only env vars referenced from a client component.
pub struct ServerEnvInClientRule;

impl Rule for ServerEnvInClientRule {
    fn id(&self) -> &'static str {
        "framework/server-env-in-client"
    }
    fn name(&self) -> &'static str {
        "Server env in client code"
    }
    fn category(&self) -> Category {
        Category::Framework
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn help(&self) -> &'static str {
        "Only NEXT_PUBLIC_ variables are inlined into client bundles; everything else is undefined in the browser."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let mut diags = Vec::new();
        for file in component_files(ctx) {
            let Some(content) = ctx.read_file(&file) else {
                continue;
            };
            if !has_use_client(&content) {
                continue;
            }
            let mut reported: Vec<String> = Vec::new();
            for (idx, line) in content.lines().enumerate() {
                for cap in env_access().captures_iter(line) {
                    let var = cap[1].to_string();
                    if var.starts_with("NEXT_PUBLIC_") || var == "NODE_ENV" {
                        continue;
                    }
                    if reported.contains(&var) {
                        continue;
                    }
                    let mut diag = self.diagnostic(
                        &file,
                        format!("process.env.{var} is read in a client component."),
                    );
                    diag.line = Some(idx as u32 + 1);
                    diags.push(diag);
                    reported.push(var);
                }
            }
        }
        Ok(diags)
    }
}

/// Both the app router and the pages router populated.
pub struct MixedRoutersRule;

impl Rule for MixedRoutersRule {
    fn id(&self) -> &'static str {
        "framework/mixed-routers"
    }
    fn name(&self) -> &'static str {
        "Single router"
    }
    fn category(&self) -> Category {
        Category::Framework
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn help(&self) -> &'static str {
        "Finish the migration: serve every route from either app/ or pages/, not both."
    }
    fn applies_to(&self) -> &'static [ProjectKind] {
        NEXT_ONLY
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>> {
        let sources = ctx.source_files(SCAN_DEPTH);
        let app_router_used = sources.iter().any(|p| {
            (p.starts_with("app/") || p.starts_with("src/app/"))
                && Path::new(p)
                    .file_stem()
                    .is_some_and(|s| s == "page")
        });
        // pages/api is legitimate alongside the app router; only page
        // routes count as pages-router usage.
        let pages_route = sources.iter().find(|p| {
            (p.starts_with("pages/") && !p.starts_with("pages/api/"))
                || (p.starts_with("src/pages/") && !p.starts_with("src/pages/api/"))
        });
        match (app_router_used, pages_route) {
            (true, Some(route)) => {
                let dir = if route.starts_with("src/") { "src/pages" } else { "pages" };
                Ok(vec![self.diagnostic(
                    dir,
                    "Both the app router and the pages router serve routes.".to_string(),
                )])
            }
            _ => Ok(vec![]),
        }
    }
}
