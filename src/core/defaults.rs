use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::build::WaitOptions;
use crate::error::{Error, Result};
use crate::invocation::{IdentifierQuoting, GLOBAL_REGION};
use crate::paths;
use crate::utils::io;

/// Root configuration structure for triggerdeck.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via triggerdeck.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Whether trigger/project/region/branch values are escaped on the
    /// command line (`harden`) or interpolated verbatim (`preserve`).
    #[serde(default)]
    pub identifier_quoting: IdentifierQuoting,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_recent_builds_limit")]
    pub recent_builds_limit: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: default_region(),
            branch: default_branch(),
            identifier_quoting: IdentifierQuoting::default(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
            recent_builds_limit: default_recent_builds_limit(),
        }
    }
}

impl Defaults {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_region() -> String {
    GLOBAL_REGION.to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_poll_timeout_secs() -> u64 {
    600
}

fn default_recent_builds_limit() -> u32 {
    10
}

// =============================================================================
// Loading and saving
// =============================================================================

/// Load the full triggerdeck.json config, falling back to defaults on any error.
pub fn load_config() -> AppConfig {
    load_config_strict().unwrap_or_default()
}

/// Load triggerdeck.json, reporting an unreadable or invalid file.
pub fn load_config_strict() -> Result<AppConfig> {
    load_config_from(&paths::config_json()?)
}

/// Load config from a specific file. A missing file yields built-in defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = io::read_file(path, &format!("read {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

/// Save config to triggerdeck.json (creates if missing).
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&paths::config_json()?, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize triggerdeck.json".to_string())))?;

    io::write_file_atomic(path, &content, &format!("write {}", path.display()))
}

/// Set a value at a JSON pointer inside the config, validating the result.
pub fn set_pointer(config: &AppConfig, pointer: &str, value: serde_json::Value) -> Result<AppConfig> {
    if !pointer.starts_with('/') {
        return Err(Error::validation_invalid_argument(
            "pointer",
            "JSON pointer must start with '/'",
            None,
            None,
        ));
    }

    let mut root = serde_json::to_value(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;

    let slot = root.pointer_mut(pointer).ok_or_else(|| {
        Error::config_invalid_value(pointer, None, "No such configuration key")
    })?;
    *slot = value;

    serde_json::from_value(root).map_err(|e| {
        Error::config_invalid_value(pointer, None, format!("Rejected value: {}", e))
    })
}

/// Delete triggerdeck.json (reset to defaults)
pub fn reset_config() -> Result<bool> {
    let path = paths::config_json()?;
    io::remove_file_if_exists(&path, &format!("delete {}", path.display()))
}

/// Get the path to triggerdeck.json (for display purposes)
pub fn config_path() -> Result<String> {
    Ok(paths::config_json()?.display().to_string())
}
