//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use keycommander::keymap::mapping_from;
use keycommander::{
    listener, CommanderEvent, CommanderOptions, EventTarget, KeyboardCommander, Mapping,
};

/// Notifications seen by a [`Recorder`], in order
pub type Log = Rc<RefCell<Vec<(CommanderEvent, Option<String>)>>>;

/// Records every notification a commander emits
#[derive(Default, Clone)]
pub struct Recorder {
    pub log: Log,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recording listener for every event on `options`
    pub fn attach(&self, options: CommanderOptions) -> CommanderOptions {
        CommanderEvent::ALL
            .into_iter()
            .fold(options, |options, event| {
                let log = Rc::clone(&self.log);
                options.on(
                    event,
                    listener(move |payload: Option<&str>| {
                        log.borrow_mut().push((event, payload.map(str::to_string)));
                        Ok(())
                    }),
                )
            })
    }

    /// Payloads recorded for one event
    pub fn payloads(&self, event: CommanderEvent) -> Vec<Option<String>> {
        self.log
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn count(&self, event: CommanderEvent) -> usize {
        self.payloads(event).len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// A mounted commander over `mapping`, with a recorder cleared of
/// construction-time notifications
pub fn test_commander(
    mapping: Mapping,
    trigger_on_repeat: bool,
) -> (KeyboardCommander, Rc<RefCell<EventTarget>>, Recorder) {
    let target = EventTarget::shared();
    let recorder = Recorder::new();
    let options = recorder.attach(
        CommanderOptions::new()
            .with_input_source(Rc::clone(&target))
            .trigger_on_repeat(trigger_on_repeat),
    );
    let commander = KeyboardCommander::new(mapping, options).expect("commander should build");
    recorder.clear();
    (commander, target, recorder)
}

/// The `{"a": "move-left"}` commander used by most scenarios
pub fn move_left_commander() -> (KeyboardCommander, Rc<RefCell<EventTarget>>, Recorder) {
    test_commander(mapping_from([("a", "move-left")]), false)
}
