//! Dispatch engine: turns raw key events into command notifications
//!
//! A [`KeyboardCommander`] owns one mapping table, one held-down tracker and
//! one notifier. It attaches a press handler and a release handler to an
//! input source; every press is filtered, tracked, resolved through the
//! mapping and announced as either `command` (with the command) or
//! `missingCommand` (with the raw key).
//!
//! # Per-key state
//!
//! ```text
//! Up --press--> Down --press (repeat)--> Down --release--> Up
//! ```
//!
//! Repeat presses never write state. They dispatch only when
//! `trigger_on_repeat` is set.
//!
//! # Re-entrancy
//!
//! No internal borrow is held while listeners run, so a listener may call back
//! into the commander (remap a key, unmount, ...). Listener errors abort the
//! remaining listeners for that trigger and are returned to the caller; see
//! [`crate::notifier`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use crate::error::CommanderError;
use crate::keymap::{
    mapping_from_json_value, mapping_from_yaml_value, Command, Key, Mapping, MappingTable,
};
use crate::notifier::{Listener, Notifier};
use crate::source::{InputSource, KeyEvent, KeyEventKind, KeyHandler};
use crate::state::DownState;

/// Notifications emitted by a commander
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommanderEvent {
    /// A mapped key was pressed; payload is the command
    Command,
    /// An unmapped key was pressed; payload is the raw key
    MissingCommand,
    /// Handlers were attached to the input source; no payload
    Mount,
    /// Handlers were detached from the input source; no payload
    Unmount,
    /// The mapping changed; no payload
    Mapping,
}

impl CommanderEvent {
    pub const ALL: [CommanderEvent; 5] = [
        CommanderEvent::Command,
        CommanderEvent::MissingCommand,
        CommanderEvent::Mount,
        CommanderEvent::Unmount,
        CommanderEvent::Mapping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommanderEvent::Command => "command",
            CommanderEvent::MissingCommand => "missingCommand",
            CommanderEvent::Mount => "mount",
            CommanderEvent::Unmount => "unmount",
            CommanderEvent::Mapping => "mapping",
        }
    }
}

impl fmt::Display for CommanderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommanderEvent {
    type Err = CommanderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommanderEvent::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| CommanderError::InvalidArgument(format!("Unknown event: {}", s)))
    }
}

/// Default target classifications that neither dispatch nor get their
/// default handling suppressed
pub const DEFAULT_TEXT_TARGETS: [&str; 2] = ["TEXTAREA", "INPUT"];

fn default_text_targets() -> BTreeSet<String> {
    DEFAULT_TEXT_TARGETS.iter().map(|s| s.to_string()).collect()
}

/// Construction options for [`KeyboardCommander`]
#[derive(Clone)]
pub struct CommanderOptions {
    /// Attach to the input source during construction
    pub auto_mount: bool,
    /// Dispatch auto-repeat presses as well as the initial press
    pub trigger_on_repeat: bool,
    /// Targets whose presses are ignored entirely
    pub node_names_dont_trigger: BTreeSet<String>,
    /// Targets whose default handling is left alone
    pub node_names_allow_default: BTreeSet<String>,
    /// Required; construction fails without it
    pub input_source: Option<Rc<RefCell<dyn InputSource>>>,
    /// Listeners registered during construction, before auto-mount
    pub listeners: Vec<(CommanderEvent, Listener<str>)>,
}

impl Default for CommanderOptions {
    fn default() -> Self {
        Self {
            auto_mount: true,
            trigger_on_repeat: false,
            node_names_dont_trigger: default_text_targets(),
            node_names_allow_default: default_text_targets(),
            input_source: None,
            listeners: Vec::new(),
        }
    }
}

impl CommanderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_source<S: InputSource + 'static>(mut self, source: Rc<RefCell<S>>) -> Self {
        let source: Rc<RefCell<dyn InputSource>> = source;
        self.input_source = Some(source);
        self
    }

    pub fn auto_mount(mut self, auto_mount: bool) -> Self {
        self.auto_mount = auto_mount;
        self
    }

    pub fn trigger_on_repeat(mut self, trigger_on_repeat: bool) -> Self {
        self.trigger_on_repeat = trigger_on_repeat;
        self
    }

    pub fn node_names_dont_trigger<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_names_dont_trigger = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn node_names_allow_default<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_names_allow_default = names.into_iter().map(Into::into).collect();
        self
    }

    /// Register `listener` for `event` at construction time
    pub fn on(mut self, event: CommanderEvent, listener: Listener<str>) -> Self {
        self.listeners.push((event, listener));
        self
    }
}

impl fmt::Debug for CommanderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommanderOptions")
            .field("auto_mount", &self.auto_mount)
            .field("trigger_on_repeat", &self.trigger_on_repeat)
            .field("node_names_dont_trigger", &self.node_names_dont_trigger)
            .field("node_names_allow_default", &self.node_names_allow_default)
            .field("input_source", &self.input_source.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

struct Inner {
    table: RefCell<MappingTable>,
    state: RefCell<DownState>,
    notifier: Notifier<CommanderEvent, str>,
    source: Rc<RefCell<dyn InputSource>>,
    press_handler: KeyHandler,
    release_handler: KeyHandler,
    /// Attachments made by `mount` and not yet undone by `unmount`
    mounts: Cell<usize>,
    trigger_on_repeat: bool,
    node_names_dont_trigger: BTreeSet<String>,
    node_names_allow_default: BTreeSet<String>,
}

fn key_handler(inner: Weak<Inner>, kind: KeyEventKind) -> KeyHandler {
    Rc::new(move |event: &mut KeyEvent| {
        let Some(inner) = inner.upgrade() else {
            return Ok(());
        };
        match kind {
            KeyEventKind::Press => inner.handle_press(event),
            KeyEventKind::Release => inner.handle_release(event),
        }
    })
}

impl Inner {
    fn lookup(&self, key: &str) -> Option<Command> {
        self.table.borrow().command_for(key).cloned()
    }

    fn mapping_changed(&self) -> Result<(), CommanderError> {
        self.notifier.trigger(CommanderEvent::Mapping, None)
    }

    fn mount(&self) -> Result<(), CommanderError> {
        {
            let mut source = self.source.borrow_mut();
            source.add_listener(KeyEventKind::Press, Rc::clone(&self.press_handler));
            source.add_listener(KeyEventKind::Release, Rc::clone(&self.release_handler));
        }
        self.mounts.set(self.mounts.get() + 1);
        if self.mounts.get() > 1 {
            tracing::warn!(
                "Commander mounted {} times without unmount; events will be handled more than once",
                self.mounts.get()
            );
        } else {
            tracing::info!("Commander mounted");
        }
        self.notifier.trigger(CommanderEvent::Mount, None)
    }

    fn unmount(&self) -> Result<(), CommanderError> {
        let detached = {
            let mut source = self.source.borrow_mut();
            let press = source.remove_listener(KeyEventKind::Press, &self.press_handler);
            let release = source.remove_listener(KeyEventKind::Release, &self.release_handler);
            press || release
        };
        if detached {
            self.mounts.set(self.mounts.get().saturating_sub(1));
            tracing::info!("Commander unmounted");
        } else {
            tracing::debug!("Unmount requested but no handlers were attached");
        }
        self.notifier.trigger(CommanderEvent::Unmount, None)
    }

    fn handle_press(&self, event: &mut KeyEvent) -> Result<(), CommanderError> {
        if let Some(target) = event.target.as_deref() {
            if self.node_names_dont_trigger.contains(target) {
                tracing::debug!(key = %event.key, node = target, "Press ignored for target");
                return Ok(());
            }
        }

        let allow_default = event
            .target
            .as_deref()
            .is_some_and(|t| self.node_names_allow_default.contains(t));
        if !allow_default {
            event.prevent_default();
        }

        if !event.repeat {
            let command = self.lookup(event.key.as_str());
            self.state
                .borrow_mut()
                .record_key_down(&event.key, command.as_ref());
        }

        if !event.repeat || self.trigger_on_repeat {
            tracing::debug!(
                key = %event.key,
                repeat = event.repeat,
                ctrl = event.modifiers.ctrl(),
                shift = event.modifiers.shift(),
                alt = event.modifiers.alt(),
                meta = event.modifiers.meta(),
                "Dispatching press"
            );
            self.trigger_key(event.key.as_str())
        } else {
            tracing::trace!(key = %event.key, "Repeat press suppressed");
            Ok(())
        }
    }

    fn handle_release(&self, event: &mut KeyEvent) -> Result<(), CommanderError> {
        let command = self.lookup(event.key.as_str());
        self.state
            .borrow_mut()
            .record_key_up(&event.key, command.as_ref());
        Ok(())
    }

    fn trigger_key(&self, key: &str) -> Result<(), CommanderError> {
        match self.lookup(key) {
            Some(command) => self
                .notifier
                .trigger(CommanderEvent::Command, Some(command.as_str())),
            None => {
                tracing::debug!("No command for key {:?}", key);
                self.notifier
                    .trigger(CommanderEvent::MissingCommand, Some(key))
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.mounts.get() == 0 {
            return;
        }
        // Handlers only hold a weak reference, but leaving them attached would
        // keep dead entries in the source.
        match self.source.try_borrow_mut() {
            Ok(mut source) => {
                for _ in 0..self.mounts.get() {
                    source.remove_listener(KeyEventKind::Press, &self.press_handler);
                    source.remove_listener(KeyEventKind::Release, &self.release_handler);
                }
            }
            Err(_) => tracing::warn!(
                "Input source borrowed while commander dropped; leaving {} inert handler pair(s) attached",
                self.mounts.get()
            ),
        }
    }
}

/// Maps keys to commands and notifies listeners about presses
///
/// Cloning yields another handle to the same commander. A listener that
/// captures a strong handle keeps the commander alive through a reference
/// cycle; capture a [`WeakCommander`] instead.
#[derive(Clone)]
pub struct KeyboardCommander {
    inner: Rc<Inner>,
}

/// Non-owning handle to a [`KeyboardCommander`]
#[derive(Clone)]
pub struct WeakCommander {
    inner: Weak<Inner>,
}

impl WeakCommander {
    pub fn upgrade(&self) -> Option<KeyboardCommander> {
        self.inner.upgrade().map(|inner| KeyboardCommander { inner })
    }
}

impl KeyboardCommander {
    /// Create a commander with an initial mapping
    ///
    /// Fails with `Configuration` if `options.input_source` is missing. The
    /// initial `mapping` notification fires before option listeners are
    /// registered, so only `mount` (with `auto_mount`) reaches them.
    pub fn new(mapping: Mapping, options: CommanderOptions) -> Result<Self, CommanderError> {
        let CommanderOptions {
            auto_mount,
            trigger_on_repeat,
            node_names_dont_trigger,
            node_names_allow_default,
            input_source,
            listeners,
        } = options;

        let source = input_source.ok_or_else(|| {
            CommanderError::Configuration("an input source is required".to_string())
        })?;

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| Inner {
            table: RefCell::new(MappingTable::new()),
            state: RefCell::new(DownState::new()),
            notifier: Notifier::new(),
            source,
            press_handler: key_handler(weak.clone(), KeyEventKind::Press),
            release_handler: key_handler(weak.clone(), KeyEventKind::Release),
            mounts: Cell::new(0),
            trigger_on_repeat,
            node_names_dont_trigger,
            node_names_allow_default,
        });
        let commander = KeyboardCommander { inner };

        commander.set_mapping(mapping)?;
        for (event, listener) in listeners {
            commander.on(event, listener);
        }
        if auto_mount {
            commander.mount()?;
        }

        Ok(commander)
    }

    pub fn downgrade(&self) -> WeakCommander {
        WeakCommander {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ------------------------------------------------------------------------
    // Mapping
    // ------------------------------------------------------------------------

    /// Replace the whole mapping; emits `mapping`
    pub fn set_mapping(&self, mapping: Mapping) -> Result<(), CommanderError> {
        tracing::debug!("Setting mapping ({} bindings)", mapping.len());
        self.inner.table.borrow_mut().set_mapping(mapping);
        self.inner.mapping_changed()
    }

    /// Replace the whole mapping from a JSON value
    ///
    /// Fails with `InvalidArgument`, mutating nothing, unless the value is an
    /// object of string commands.
    pub fn set_mapping_json(&self, value: &serde_json::Value) -> Result<(), CommanderError> {
        let mapping = mapping_from_json_value(value)?;
        self.set_mapping(mapping)
    }

    /// Replace the whole mapping from a YAML value; same rules as
    /// [`set_mapping_json`](Self::set_mapping_json)
    pub fn set_mapping_yaml(&self, value: &serde_yaml::Value) -> Result<(), CommanderError> {
        let mapping = mapping_from_yaml_value(value)?;
        self.set_mapping(mapping)
    }

    /// Map `key` to `command`, overwriting; emits `mapping`
    pub fn map_key(
        &self,
        key: impl Into<Key>,
        command: impl Into<Command>,
    ) -> Result<bool, CommanderError> {
        let mapped = self
            .inner
            .table
            .borrow_mut()
            .map_key(key.into(), command.into());
        self.inner.mapping_changed()?;
        Ok(mapped)
    }

    /// Map `key` only if it has no mapping yet
    ///
    /// Returns `Ok(false)` without emitting anything if `key` is mapped.
    pub fn map_unmapped_key(
        &self,
        key: impl Into<Key>,
        command: impl Into<Command>,
    ) -> Result<bool, CommanderError> {
        let mapped = self
            .inner
            .table
            .borrow_mut()
            .map_unmapped_key(key.into(), command.into());
        if mapped {
            self.inner.mapping_changed()?;
        }
        Ok(mapped)
    }

    /// Remove the mapping for `key`
    ///
    /// Returns `Ok(false)` without emitting anything if `key` was not mapped.
    pub fn unmap_key(&self, key: &str) -> Result<bool, CommanderError> {
        let removed = self.inner.table.borrow_mut().unmap_key(key);
        if removed {
            self.inner.mapping_changed()?;
        }
        Ok(removed)
    }

    pub fn command_for(&self, key: &str) -> Option<Command> {
        self.inner.lookup(key)
    }

    pub fn keys_mapped(&self) -> Vec<Key> {
        self.inner.table.borrow().keys_mapped()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.inner.table.borrow().commands()
    }

    /// Snapshot of the current mapping
    pub fn mapping(&self) -> Mapping {
        self.inner.table.borrow().mapping().clone()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Attach press and release handlers to the input source; emits `mount`
    ///
    /// Not idempotent: mounting twice attaches twice and every press is then
    /// handled twice.
    pub fn mount(&self) -> Result<(), CommanderError> {
        self.inner.mount()
    }

    /// Detach press and release handlers; emits `unmount`
    pub fn unmount(&self) -> Result<(), CommanderError> {
        self.inner.unmount()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounts.get() > 0
    }

    // ------------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------------

    pub fn on(&self, event: CommanderEvent, listener: Listener<str>) {
        self.inner.notifier.on(event, listener);
    }

    pub fn off(&self, event: CommanderEvent, listener: &Listener<str>) -> bool {
        self.inner.notifier.off(event, listener)
    }

    // ------------------------------------------------------------------------
    // Held-down state
    // ------------------------------------------------------------------------

    pub fn is_key_down(&self, key: &str) -> bool {
        self.inner.state.borrow().is_key_down(key)
    }

    pub fn is_command_down(&self, command: &str) -> bool {
        self.inner.state.borrow().is_command_down(command)
    }

    pub fn keys_down(&self) -> Vec<Key> {
        self.inner.state.borrow().keys_down()
    }

    pub fn commands_down(&self) -> Vec<Command> {
        self.inner.state.borrow().commands_down()
    }

    /// Reset every key and command to up, e.g. after the window loses focus
    pub fn clear_down(&self) {
        tracing::debug!("Clearing held-down state");
        self.inner.state.borrow_mut().clear_down();
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Handle a raw press event as the attached press handler would
    pub fn handle_press(&self, event: &mut KeyEvent) -> Result<(), CommanderError> {
        self.inner.handle_press(event)
    }

    /// Handle a raw release event as the attached release handler would
    pub fn handle_release(&self, event: &mut KeyEvent) -> Result<(), CommanderError> {
        self.inner.handle_release(event)
    }

    /// Announce `key` as if pressed, bypassing target filtering and state
    /// tracking
    pub fn trigger_key(&self, key: &str) -> Result<(), CommanderError> {
        self.inner.trigger_key(key)
    }

    pub fn trigger_on_repeat(&self) -> bool {
        self.inner.trigger_on_repeat
    }
}

impl fmt::Debug for KeyboardCommander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardCommander")
            .field("mapping", &*self.inner.table.borrow())
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.notifier)
            .field("mounted", &self.is_mounted())
            .field("trigger_on_repeat", &self.inner.trigger_on_repeat)
            .finish()
    }
}
