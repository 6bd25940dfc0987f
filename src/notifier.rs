//! Publish/subscribe primitive used by the commander
//!
//! Listeners are registered per named event and called synchronously in
//! registration order. A listener is an `Rc` closure; identity (for `off`) is
//! the `Rc` allocation, so keep a clone of the handle you registered if you
//! want to remove it later.
//!
//! # Error propagation
//!
//! Listener errors are not isolated from each other. The first listener that
//! returns `Err` stops the trigger: listeners after it are not called, and the
//! error is returned to the caller of [`Notifier::trigger`]. Callers that want
//! every listener to run regardless should catch errors inside their own
//! listeners.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::CommanderError;

/// A registered callback receiving an optional payload
pub type Listener<P> = Rc<dyn Fn(Option<&P>) -> anyhow::Result<()>>;

/// Wrap a closure into a [`Listener`] handle
pub fn listener<P, F>(f: F) -> Listener<P>
where
    P: ?Sized,
    F: Fn(Option<&P>) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

/// Per-event listener registry
pub struct Notifier<E, P: ?Sized> {
    listeners: RefCell<HashMap<E, Vec<Listener<P>>>>,
}

impl<E, P> Notifier<E, P>
where
    E: Copy + Eq + Hash + fmt::Display,
    P: ?Sized,
{
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Register a listener for an event
    ///
    /// No uniqueness check: registering the same handle twice means it is
    /// called twice per trigger.
    pub fn on(&self, event: E, listener: Listener<P>) {
        self.listeners
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(listener);
    }

    /// Remove the first registration of `listener` for `event`
    ///
    /// Returns false (and does nothing) if it was not registered.
    pub fn off(&self, event: E, listener: &Listener<P>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Call every listener registered for `event`, in registration order
    ///
    /// The listener list is snapshotted first, so listeners may call `on`/`off`
    /// on this notifier; the change applies from the next trigger.
    pub fn trigger(&self, event: E, payload: Option<&P>) -> Result<(), CommanderError> {
        let snapshot = match self.listeners.borrow().get(&event) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return Ok(()),
        };

        tracing::trace!("Triggering '{}' for {} listener(s)", event, snapshot.len());

        for listener in snapshot {
            listener(payload).map_err(|source| CommanderError::Listener {
                event: event.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Number of registrations for an event
    pub fn listener_count(&self, event: E) -> usize {
        self.listeners
            .borrow()
            .get(&event)
            .map_or(0, |list| list.len())
    }

    /// Drop every registration for every event
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E, P> Default for Notifier<E, P>
where
    E: Copy + Eq + Hash + fmt::Display,
    P: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P: ?Sized> fmt::Debug for Notifier<E, P>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let mut map = f.debug_map();
        for (event, list) in listeners.iter() {
            map.entry(event, &list.len());
        }
        map.finish()
    }
}
