//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into a [`Mapping`].
//!
//! ```yaml
//! bindings:
//!   a: move-left
//!   ArrowLeft: move-left
//!   " ": jump
//! ```

use std::path::Path;

use serde::Deserialize;

use super::keymap::{mapping_from_yaml_value, Mapping};

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub bindings: serde_yaml::Value,
}

/// Load a key → command mapping from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Mapping, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse a key → command mapping from a YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<Mapping, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let mapping = mapping_from_yaml_value(&config.bindings)
        .map_err(|e| KeymapError::InvalidMapping(e.to_string()))?;

    if let Some(key) = mapping.keys().find(|k| k.is_empty()) {
        return Err(KeymapError::InvalidMapping(format!(
            "Empty key bound to '{}'",
            mapping[key]
        )));
    }

    Ok(mapping)
}

/// Errors that can occur when loading keymaps
#[derive(Debug, Clone)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidMapping(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidMapping(e) => write!(f, "Invalid mapping: {}", e),
        }
    }
}

impl std::error::Error for KeymapError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Command;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
bindings:
  a: move-left
  ArrowLeft: move-left
  " ": jump
"#;

        let mapping = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get("a"), Some(&Command::from("move-left")));
        assert_eq!(mapping.get(" "), Some(&Command::from("jump")));
    }

    #[test]
    fn test_parse_yaml_without_bindings_is_empty() {
        let mapping = parse_keymap_yaml("{}").unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_parse_yaml_rejects_sequence_bindings() {
        let yaml = r#"
bindings:
  - a
  - b
"#;
        let err = parse_keymap_yaml(yaml).unwrap_err();
        assert!(matches!(err, KeymapError::InvalidMapping(_)));
    }

    #[test]
    fn test_parse_yaml_rejects_empty_key() {
        let yaml = r#"
bindings:
  "": jump
"#;
        assert!(matches!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidMapping(_))
        ));
    }

    #[test]
    fn test_parse_yaml_syntax_error() {
        let err = parse_keymap_yaml("bindings: [unclosed").unwrap_err();
        assert!(matches!(err, KeymapError::ParseError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_keymap_file(Path::new("/definitely/not/here/keymap.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("IO error"));
    }
}
