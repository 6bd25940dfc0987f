//! Input source collaborator: raw key events and listener attachment
//!
//! The commander never reads the keyboard itself. It attaches a press handler
//! and a release handler to an [`InputSource`], and the host delivers raw
//! [`KeyEvent`]s through whatever handlers are attached.
//!
//! ```text
//! host event loop → InputSource → KeyHandler → KeyboardCommander → listeners
//! ```
//!
//! [`EventTarget`] is a headless source suitable for tests, replay scripts and
//! hosts that pump events by hand.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::CommanderError;
use crate::keymap::Key;

/// Raw key event kinds an input source can deliver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    Press,
    Release,
}

impl KeyEventKind {
    /// DOM-style event name
    pub fn event_name(self) -> &'static str {
        match self {
            KeyEventKind::Press => "keydown",
            KeyEventKind::Release => "keyup",
        }
    }
}

impl fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Modifier keys held during an event, as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A raw key event delivered by an input source
///
/// Only `key`, `repeat` and `target` drive dispatch. Modifiers are carried as
/// event details and logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key identifier, e.g. `"a"` or `"ArrowLeft"`
    pub key: Key,
    /// True for auto-repeat presses fired while the key stays held
    pub repeat: bool,
    /// Classification of the element that had focus, e.g. `"INPUT"`
    pub target: Option<String>,
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl KeyEvent {
    /// A plain, non-repeat event for `key` with no target
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            repeat: false,
            target: None,
            modifiers: Modifiers::NONE,
            default_prevented: false,
        }
    }

    /// Mark as an auto-repeat event (builder pattern)
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Set the target classification (builder pattern)
    pub fn on_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set modifier flags (builder pattern)
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Ask the input source to skip its own default handling of this event
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A handler attached to an input source
pub type KeyHandler = Rc<dyn Fn(&mut KeyEvent) -> Result<(), CommanderError>>;

/// Something the commander can attach key handlers to
///
/// The commander holds the source as `Rc<RefCell<dyn InputSource>>` and
/// borrows it mutably to attach and detach. A host must release its own
/// borrow of the cell before calling handlers: listeners may mount or
/// unmount from inside a handler, and that re-borrow panics otherwise.
/// [`EventTarget::dispatch`] snapshots its handlers and drops the borrow
/// first.
pub trait InputSource {
    /// Attach `handler` for `kind` events
    ///
    /// Implementations are not required to deduplicate; attaching the same
    /// handler twice may deliver every event to it twice.
    fn add_listener(&mut self, kind: KeyEventKind, handler: KeyHandler);

    /// Detach the first attachment of `handler` for `kind`
    ///
    /// Returns false if it was not attached.
    fn remove_listener(&mut self, kind: KeyEventKind, handler: &KeyHandler) -> bool;
}

/// Headless input source that delivers events to attached handlers
#[derive(Default)]
pub struct EventTarget {
    press: Vec<KeyHandler>,
    release: Vec<KeyHandler>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target already wrapped for sharing with a commander
    pub fn shared() -> Rc<RefCell<EventTarget>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of handlers attached for `kind`
    pub fn listener_count(&self, kind: KeyEventKind) -> usize {
        self.handlers(kind).len()
    }

    fn handlers(&self, kind: KeyEventKind) -> &Vec<KeyHandler> {
        match kind {
            KeyEventKind::Press => &self.press,
            KeyEventKind::Release => &self.release,
        }
    }

    fn handlers_mut(&mut self, kind: KeyEventKind) -> &mut Vec<KeyHandler> {
        match kind {
            KeyEventKind::Press => &mut self.press,
            KeyEventKind::Release => &mut self.release,
        }
    }

    /// Deliver `event` to every handler attached for `kind`, in attach order
    ///
    /// Handlers are snapshotted and the borrow released before any is called,
    /// so a handler may attach or detach handlers (e.g. unmount a commander)
    /// while the event is in flight. Stops at the first handler error.
    pub fn dispatch(
        target: &RefCell<EventTarget>,
        kind: KeyEventKind,
        event: &mut KeyEvent,
    ) -> Result<(), CommanderError> {
        let snapshot = target.borrow().handlers(kind).clone();
        for handler in snapshot {
            handler(event)?;
        }
        Ok(())
    }

    /// Convenience wrapper: deliver a press of `key` and return the event
    pub fn press(target: &RefCell<EventTarget>, key: &str) -> Result<KeyEvent, CommanderError> {
        let mut event = KeyEvent::new(key);
        Self::dispatch(target, KeyEventKind::Press, &mut event)?;
        Ok(event)
    }

    /// Convenience wrapper: deliver a release of `key` and return the event
    pub fn release(target: &RefCell<EventTarget>, key: &str) -> Result<KeyEvent, CommanderError> {
        let mut event = KeyEvent::new(key);
        Self::dispatch(target, KeyEventKind::Release, &mut event)?;
        Ok(event)
    }
}

impl InputSource for EventTarget {
    fn add_listener(&mut self, kind: KeyEventKind, handler: KeyHandler) {
        self.handlers_mut(kind).push(handler);
    }

    fn remove_listener(&mut self, kind: KeyEventKind, handler: &KeyHandler) -> bool {
        let handlers = self.handlers_mut(kind);
        match handlers.iter().position(|h| Rc::ptr_eq(h, handler)) {
            Some(idx) => {
                handlers.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("press", &self.press.len())
            .field("release", &self.release.len())
            .finish()
    }
}
