use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "TRIGGERDECK_CONFIG_DIR";

/// Base config directory (~/.config/triggerdeck/ on all platforms but Windows)
pub fn triggerdeck() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("triggerdeck"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("triggerdeck"))
    }
}

/// Global triggerdeck.json config file path
pub fn config_json() -> Result<PathBuf> {
    Ok(triggerdeck()?.join("triggerdeck.json"))
}

/// Persisted selection, substitutions and pins
pub fn state_json() -> Result<PathBuf> {
    Ok(triggerdeck()?.join("state.json"))
}
