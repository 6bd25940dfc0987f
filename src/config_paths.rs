//! Where keycommander keeps its files
//!
//! Everything lives in one directory:
//!
//! ```text
//! <config dir>/
//!   config.yaml      commander options (see `CommanderConfig`)
//!   keymap.yaml      user keymap, layered over the embedded defaults
//!   logs/            daily rolling log files
//! ```
//!
//! The directory is `$KEYCOMMANDER_CONFIG_DIR` when set, otherwise
//! `keycommander/` under the platform config home (`$XDG_CONFIG_HOME` or
//! `~/.config` on Unix/macOS, `%APPDATA%` on Windows).

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "keycommander";

/// Environment variable that relocates the whole config directory
pub const CONFIG_DIR_ENV: &str = "KEYCOMMANDER_CONFIG_DIR";

pub const CONFIG_FILE: &str = "config.yaml";
pub const KEYMAP_FILE: &str = "keymap.yaml";
pub const LOGS_DIR: &str = "logs";
/// Prefix of the rolling log files; the appender adds a date suffix
pub const LOG_FILE_PREFIX: &str = "keycommander.log";

fn platform_config_home() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir()
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
    }
}

fn resolve_config_dir(
    override_dir: Option<OsString>,
    config_home: Option<PathBuf>,
) -> Option<PathBuf> {
    match override_dir.filter(|dir| !dir.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => config_home.map(|home| home.join(APP_DIR)),
    }
}

/// The keycommander config directory, if one can be determined
pub fn config_dir() -> Option<PathBuf> {
    resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV), platform_config_home())
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(KEYMAP_FILE))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

/// Create the logs directory (and the config directory above it)
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    std::fs::create_dir_all(&logs)
        .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
    Ok(logs)
}
