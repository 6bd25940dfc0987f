//! Held-down tracking for keys and commands
//!
//! Level-triggered companion to the edge-triggered `command` notifications:
//! a render loop can ask "is move-left held right now" instead of counting
//! presses and releases itself.
//!
//! Command state is derived through the mapping at the moment a key changes
//! state and is never recomputed. Changing the mapping while a key is held
//! leaves the command state as it was until that key is released or
//! [`DownState::clear_down`] is called.

use std::collections::BTreeMap;

use crate::keymap::{Command, Key};

/// Key and command held-down state
///
/// Absent entries read as "up".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownState {
    keys: BTreeMap<Key, bool>,
    commands: BTreeMap<Command, bool>,
}

impl DownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a (non-repeat) press of `key`, resolved to `command`
    pub fn record_key_down(&mut self, key: &Key, command: Option<&Command>) {
        tracing::trace!(key = %key, command = ?command.map(Command::as_str), "key down");
        self.keys.insert(key.clone(), true);
        if let Some(command) = command.filter(|c| !c.is_empty()) {
            self.commands.insert(command.clone(), true);
        }
    }

    /// Record a release of `key`, resolved to `command`
    pub fn record_key_up(&mut self, key: &Key, command: Option<&Command>) {
        tracing::trace!(key = %key, command = ?command.map(Command::as_str), "key up");
        self.keys.insert(key.clone(), false);
        if let Some(command) = command.filter(|c| !c.is_empty()) {
            self.commands.insert(command.clone(), false);
        }
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn is_command_down(&self, command: &str) -> bool {
        self.commands.get(command).copied().unwrap_or(false)
    }

    /// Keys currently held, in sorted order
    pub fn keys_down(&self) -> Vec<Key> {
        self.keys
            .iter()
            .filter(|(_, down)| **down)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Commands currently held, in sorted order
    pub fn commands_down(&self) -> Vec<Command> {
        self.commands
            .iter()
            .filter(|(_, down)| **down)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Forget everything; every key and command reads as up afterwards
    ///
    /// Use after focus loss, when release events may never arrive.
    pub fn clear_down(&mut self) {
        self.keys.clear();
        self.commands.clear();
    }
}
