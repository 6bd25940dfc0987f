//! Default key bindings
//!
//! The shipped keymap is keymap.yaml at the project root, embedded at compile
//! time. [`default_mapping`] is the hardcoded fallback used if that file ever
//! fails to parse.

use std::path::Path;

use super::config::{load_keymap_file, parse_keymap_yaml};
use super::keymap::{mapping_from, Mapping};

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the embedded default keymap YAML
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: defaults + overrides
///
/// Loading order (each layer overrides the previous):
/// 1. Embedded default keymap (compiled into binary)
/// 2. keymap.yaml in current directory (project-local overrides)
/// 3. User keymap at ~/.config/keycommander/keymap.yaml
///
/// Override bindings to `Unbound` remove the key from the result.
pub fn load_default_keymap() -> Mapping {
    let mut mapping = match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(m) => {
            tracing::info!("Loaded embedded default keymap ({} bindings)", m.len());
            m
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymap: {}, using hardcoded defaults",
                e
            );
            default_mapping()
        }
    };

    if let Ok(local) = load_keymap_file(Path::new("keymap.yaml")) {
        tracing::info!("Merging project keymap.yaml ({} bindings)", local.len());
        mapping = merge_mappings(mapping, local);
    }

    if let Some(user_path) = crate::config_paths::keymap_file() {
        if user_path.exists() {
            match load_keymap_file(&user_path) {
                Ok(user) => {
                    tracing::info!(
                        "Merging user keymap from {} ({} bindings)",
                        user_path.display(),
                        user.len()
                    );
                    mapping = merge_mappings(mapping, user);
                }
                Err(e) => {
                    tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
                }
            }
        }
    }

    mapping
}

/// Merge override bindings into base bindings
///
/// - Override bound to `Unbound` → key removed
/// - Otherwise → override replaces or extends the base
pub fn merge_mappings(base: Mapping, overrides: Mapping) -> Mapping {
    let mut result = base;

    for (key, command) in overrides {
        if command.is_unbound() {
            result.remove(&key);
        } else {
            result.insert(key, command);
        }
    }

    result
}

/// Hardcoded fallback bindings
pub fn default_mapping() -> Mapping {
    mapping_from([
        // Movement
        ("ArrowUp", "move-up"),
        ("ArrowDown", "move-down"),
        ("ArrowLeft", "move-left"),
        ("ArrowRight", "move-right"),
        ("w", "move-up"),
        ("s", "move-down"),
        ("a", "move-left"),
        ("d", "move-right"),
        // Actions
        (" ", "jump"),
        ("Enter", "confirm"),
        ("Escape", "cancel"),
        ("p", "pause"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Command, Key};

    #[test]
    fn test_embedded_yaml_parses() {
        let mapping = parse_keymap_yaml(get_default_keymap_yaml())
            .expect("Embedded keymap.yaml should parse successfully");
        assert!(!mapping.is_empty());
    }

    #[test]
    fn test_embedded_yaml_matches_hardcoded_defaults() {
        let mapping = parse_keymap_yaml(get_default_keymap_yaml()).unwrap();
        assert_eq!(mapping, default_mapping());
    }

    #[test]
    fn test_merge_overrides_and_extends() {
        let base = mapping_from([("a", "move-left"), ("d", "move-right")]);
        let user = mapping_from([("a", "strafe-left"), ("q", "quit")]);

        let merged = merge_mappings(base, user);

        assert_eq!(merged.get("a"), Some(&Command::from("strafe-left")));
        assert_eq!(merged.get("d"), Some(&Command::from("move-right")));
        assert_eq!(merged.get("q"), Some(&Command::from("quit")));
    }

    #[test]
    fn test_merge_unbound_removes_key() {
        let base = mapping_from([("a", "move-left"), ("d", "move-right")]);
        let user = mapping_from([("a", "Unbound"), ("z", "Unbound")]);

        let merged = merge_mappings(base, user);

        assert!(!merged.contains_key(&Key::from("a")));
        assert!(!merged.contains_key(&Key::from("z")));
        assert_eq!(merged.len(), 1);
    }
}
