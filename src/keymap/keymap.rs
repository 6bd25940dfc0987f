//! Mapping table storing key → command associations

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Command, Key};
use crate::error::CommanderError;

/// A key → command table
///
/// Keys are unique; several keys may share a command. Ordered so that
/// enumeration is stable.
pub type Mapping = BTreeMap<Key, Command>;

/// Build a mapping from `(key, command)` pairs
pub fn mapping_from<I, K, C>(pairs: I) -> Mapping
where
    I: IntoIterator<Item = (K, C)>,
    K: Into<Key>,
    C: Into<Command>,
{
    pairs
        .into_iter()
        .map(|(k, c)| (k.into(), c.into()))
        .collect()
}

/// Convert a dynamically typed YAML value into a mapping
///
/// Fails with `InvalidArgument` unless the value is a map whose keys and
/// values are all strings. `null` is accepted as an empty mapping.
pub fn mapping_from_yaml_value(value: &serde_yaml::Value) -> Result<Mapping, CommanderError> {
    use serde_yaml::Value;

    let map = match value {
        Value::Null => return Ok(Mapping::new()),
        Value::Mapping(map) => map,
        other => {
            return Err(CommanderError::InvalidArgument(format!(
                "Expected a key → command map, got {}",
                yaml_type_name(other)
            )))
        }
    };

    let mut mapping = Mapping::new();
    for (key, command) in map {
        let (Value::String(key), Value::String(command)) = (key, command) else {
            return Err(CommanderError::InvalidArgument(format!(
                "Mapping entries must be strings, got {} → {}",
                yaml_type_name(key),
                yaml_type_name(command)
            )));
        };
        mapping.insert(Key::from(key.as_str()), Command::from(command.as_str()));
    }
    Ok(mapping)
}

/// Convert a dynamically typed JSON value into a mapping
///
/// Same rules as [`mapping_from_yaml_value`].
pub fn mapping_from_json_value(value: &serde_json::Value) -> Result<Mapping, CommanderError> {
    use serde_json::Value;

    let map = match value {
        Value::Null => return Ok(Mapping::new()),
        Value::Object(map) => map,
        other => {
            return Err(CommanderError::InvalidArgument(format!(
                "Expected a key → command object, got {}",
                json_type_name(other)
            )))
        }
    };

    let mut mapping = Mapping::new();
    for (key, command) in map {
        let Value::String(command) = command else {
            return Err(CommanderError::InvalidArgument(format!(
                "Command for key '{}' must be a string, got {}",
                key,
                json_type_name(command)
            )));
        };
        mapping.insert(Key::from(key.as_str()), Command::from(command.as_str()));
    }
    Ok(mapping)
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a map",
        Value::Tagged(_) => "a tagged value",
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The key → command table owned by a commander
///
/// Mutators report whether anything changed; the commander emits its
/// `mapping` event after each successful mutation.
///
/// An empty command means "no command": binding a key to `""` leaves it
/// unmapped, so the table never stores empty commands and every query
/// agrees on which keys are mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    mapping: Mapping,
}

impl MappingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            mapping: Mapping::new(),
        }
    }

    /// Create a table holding `mapping`
    pub fn with_mapping(mapping: Mapping) -> Self {
        let mut table = Self::new();
        table.set_mapping(mapping);
        table
    }

    /// Replace the whole table; entries with an empty command are dropped
    pub fn set_mapping(&mut self, mut mapping: Mapping) {
        mapping.retain(|key, command| {
            if command.is_empty() {
                tracing::debug!("Dropping empty command bound to {:?}", key.as_str());
            }
            !command.is_empty()
        });
        self.mapping = mapping;
    }

    /// Map `key` to `command`, overwriting any existing mapping
    ///
    /// An empty `command` clears the key's mapping instead.
    pub fn map_key(&mut self, key: Key, command: Command) -> bool {
        if command.is_empty() {
            self.mapping.remove(&key);
        } else {
            self.mapping.insert(key, command);
        }
        true
    }

    /// Map `key` to `command` only if `key` has no mapping yet
    pub fn map_unmapped_key(&mut self, key: Key, command: Command) -> bool {
        if self.command_for(key.as_str()).is_some() {
            return false;
        }
        self.map_key(key, command)
    }

    /// Remove the mapping for `key`; false if there was none
    pub fn unmap_key(&mut self, key: &str) -> bool {
        self.mapping.remove(key).is_some()
    }

    /// Look up the command bound to `key`
    pub fn command_for(&self, key: &str) -> Option<&Command> {
        self.mapping.get(key)
    }

    /// Check if `key` has a mapping
    pub fn is_mapped(&self, key: &str) -> bool {
        self.command_for(key).is_some()
    }

    /// All mapped keys, in sorted order
    pub fn keys_mapped(&self) -> Vec<Key> {
        self.mapping.keys().cloned().collect()
    }

    /// Distinct commands reachable from the table, in sorted order
    pub fn commands(&self) -> Vec<Command> {
        self.mapping
            .values()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Keys currently bound to `command`
    pub fn keys_for(&self, command: &str) -> Vec<Key> {
        self.mapping
            .iter()
            .filter(|(_, c)| c.as_str() == command)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Borrow the underlying mapping
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MappingTable {
        MappingTable::with_mapping(mapping_from([
            ("a", "move-left"),
            ("ArrowLeft", "move-left"),
            ("d", "move-right"),
        ]))
    }

    #[test]
    fn test_lookup() {
        let table = table();
        assert_eq!(table.command_for("a"), Some(&Command::from("move-left")));
        assert_eq!(table.command_for("z"), None);
    }

    #[test]
    fn test_map_key_overwrites() {
        let mut table = table();
        assert!(table.map_key(Key::from("a"), Command::from("jump")));
        assert_eq!(table.command_for("a"), Some(&Command::from("jump")));
    }

    #[test]
    fn test_map_unmapped_key_protects_existing() {
        let mut table = table();
        assert!(!table.map_unmapped_key(Key::from("a"), Command::from("jump")));
        assert_eq!(table.command_for("a"), Some(&Command::from("move-left")));

        assert!(table.map_unmapped_key(Key::from("w"), Command::from("jump")));
        assert!(table.keys_mapped().contains(&Key::from("w")));
    }

    #[test]
    fn test_unmap_key() {
        let mut table = table();
        assert!(table.unmap_key("d"));
        assert!(!table.unmap_key("d"));
        assert!(!table.is_mapped("d"));
    }

    #[test]
    fn test_commands_are_distinct() {
        let table = table();
        assert_eq!(
            table.commands(),
            vec![Command::from("move-left"), Command::from("move-right")]
        );
    }

    #[test]
    fn test_commands_drop_stale_entries_after_unmap() {
        let mut table = table();
        table.unmap_key("d");
        assert_eq!(table.commands(), vec![Command::from("move-left")]);

        table.unmap_key("a");
        assert_eq!(table.commands(), vec![Command::from("move-left")]);

        table.unmap_key("ArrowLeft");
        assert!(table.commands().is_empty());
    }

    #[test]
    fn test_keys_for_command() {
        let table = table();
        assert_eq!(
            table.keys_for("move-left"),
            vec![Key::from("ArrowLeft"), Key::from("a")]
        );
    }

    #[test]
    fn test_empty_command_counts_as_unmapped() {
        let mut table = MappingTable::new();
        assert!(table.map_key(Key::from("q"), Command::from("")));
        assert!(!table.is_mapped("q"));
        assert!(table.keys_mapped().is_empty());
        assert!(table.commands().is_empty());
        assert!(!table.unmap_key("q"));
        assert!(table.map_unmapped_key(Key::from("q"), Command::from("quit")));
    }

    #[test]
    fn test_empty_command_clears_existing_binding() {
        let mut table = table();
        table.map_key(Key::from("d"), Command::from(""));
        assert_eq!(table.keys_mapped(), vec![Key::from("ArrowLeft"), Key::from("a")]);
        assert_eq!(table.commands(), vec![Command::from("move-left")]);
    }

    #[test]
    fn test_set_mapping_drops_empty_commands() {
        let table = MappingTable::with_mapping(mapping_from([("q", ""), ("a", "move-left")]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.keys_mapped(), vec![Key::from("a")]);
        assert_eq!(table.mapping().get("q"), None);
    }

    #[test]
    fn test_mapping_from_yaml_value() {
        let value: serde_yaml::Value = serde_yaml::from_str("a: move-left\nb: fire\n").unwrap();
        let mapping = mapping_from_yaml_value(&value).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("b"), Some(&Command::from("fire")));
    }

    #[test]
    fn test_mapping_from_yaml_rejects_non_map() {
        let value: serde_yaml::Value = serde_yaml::from_str("- a\n- b\n").unwrap();
        let err = mapping_from_yaml_value(&value).unwrap_err();
        assert!(matches!(err, CommanderError::InvalidArgument(_)));
    }

    #[test]
    fn test_mapping_from_yaml_rejects_non_string_command() {
        let value: serde_yaml::Value = serde_yaml::from_str("a: 5\n").unwrap();
        assert!(mapping_from_yaml_value(&value).is_err());
    }

    #[test]
    fn test_mapping_from_json_value() {
        let value = serde_json::json!({ "a": "move-left" });
        let mapping = mapping_from_json_value(&value).unwrap();
        assert_eq!(mapping.get("a"), Some(&Command::from("move-left")));

        let err = mapping_from_json_value(&serde_json::json!("a")).unwrap_err();
        assert!(matches!(err, CommanderError::InvalidArgument(_)));
        assert!(mapping_from_json_value(&serde_json::json!({ "a": true })).is_err());
    }
}
