//! Commander configuration persistence
//!
//! Stores runtime options in `~/.config/keycommander/config.yaml`:
//!
//! ```yaml
//! auto_mount: true
//! trigger_on_repeat: false
//! node_names_dont_trigger: [TEXTAREA, INPUT]
//! node_names_allow_default: [TEXTAREA, INPUT]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commander::{CommanderOptions, DEFAULT_TEXT_TARGETS};

/// Options that can be set from a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommanderConfig {
    #[serde(default = "default_true")]
    pub auto_mount: bool,
    #[serde(default)]
    pub trigger_on_repeat: bool,
    #[serde(default = "default_text_targets")]
    pub node_names_dont_trigger: BTreeSet<String>,
    #[serde(default = "default_text_targets")]
    pub node_names_allow_default: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

fn default_text_targets() -> BTreeSet<String> {
    DEFAULT_TEXT_TARGETS.iter().map(|s| s.to_string()).collect()
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            auto_mount: default_true(),
            trigger_on_repeat: false,
            node_names_dont_trigger: default_text_targets(),
            node_names_allow_default: default_text_targets(),
        }
    }
}

impl CommanderConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Copy these settings into commander options
    ///
    /// The input source and listeners already on `options` are kept.
    pub fn apply(&self, options: CommanderOptions) -> CommanderOptions {
        options
            .auto_mount(self.auto_mount)
            .trigger_on_repeat(self.trigger_on_repeat)
            .node_names_dont_trigger(self.node_names_dont_trigger.iter().cloned())
            .node_names_allow_default(self.node_names_allow_default.iter().cloned())
    }
}
