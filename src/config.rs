//! Project-level configuration support
//!
//! Loads per-project configuration from a `repomedic.toml` file in the
//! scanned root.
//!
//! # Configuration Format
//!
//! ```toml
//! # repomedic.toml
//!
//! [rules]
//! disable = ["hygiene/ts-strict", "dead/unused-exports"]
//!
//! [exclude]
//! dirs = ["generated", "fixtures"]
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "repomedic.toml";

/// Project-level configuration. Everything is optional; a missing or
/// malformed file degrades to defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DoctorConfig {
    pub rules: RulesConfig,
    pub exclude: ExcludeConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids to skip, e.g. "hygiene/ts-strict".
    pub disable: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ExcludeConfig {
    /// Directory names ignored during file walks, in addition to the
    /// built-in skip list.
    pub dirs: Vec<String>,
}

impl DoctorConfig {
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.rules.disable.iter().any(|id| id == rule_id)
    }
}

/// Load project config from `repomedic.toml` in `root`. Missing file and
/// parse failure both fall back to defaults; a parse failure is logged.
pub fn load_config(root: &Path) -> DoctorConfig {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return DoctorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                DoctorConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            DoctorConfig::default()
        }
    }
}
