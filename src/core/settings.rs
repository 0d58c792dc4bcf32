//! SM-003: Settings — the sembrar.yaml operator configuration.
//!
//! Everything here has a working default so the tool runs with no config
//! file at all. Components receive settings by value; nothing reads them
//! from ambient globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Operator-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory holding the per-kind config directories
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Provisioning tool binary
    #[serde(default = "default_terraform_bin")]
    pub terraform_bin: PathBuf,

    #[serde(default = "crate::core::types::default_region")]
    pub default_region: String,

    /// Default CIDR allowed to reach SSH on composed instances
    #[serde(default = "crate::core::types::default_ssh_cidrs")]
    pub allowed_ssh_cidrs: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            terraform_bin: default_terraform_bin(),
            default_region: crate::core::types::default_region(),
            allowed_ssh_cidrs: crate::core::types::default_ssh_cidrs(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("terraform")
}

fn default_terraform_bin() -> PathBuf {
    PathBuf::from("terraform")
}

/// Parse settings from YAML text.
pub fn parse(yaml: &str) -> Result<Settings, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("settings parse error: {}", e))
}

/// Load settings from a file; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse(&content)
}

/// Template written by `sembrar init`.
pub fn template() -> &'static str {
    r#"# sembrar configuration
base_dir: terraform
terraform_bin: terraform
default_region: ap-south-1
allowed_ssh_cidrs: "10.0.0.0/8"
"#
}
