//! Scripted key event replay
//!
//! A script is a YAML list of steps delivered in order through an
//! [`EventTarget`]:
//!
//! ```yaml
//! - press: a
//! - press: { key: a, repeat: true }
//! - press: { key: a, target: INPUT }
//! - release: a
//! - map: { key: q, command: quit }
//! - unmap: q
//! - blur
//! ```
//!
//! Every notification the commander emits while the script runs is recorded
//! together with the index of the step that caused it.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::commander::{CommanderEvent, KeyboardCommander};
use crate::error::CommanderError;
use crate::keymap::{Command, Key};
use crate::notifier::{listener, Listener};
use crate::source::{EventTarget, KeyEvent, KeyEventKind, Modifiers};

/// A key event as written in a script: either a bare key or a detailed form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EventSpec {
    Key(String),
    Detailed {
        key: String,
        #[serde(default)]
        repeat: bool,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
}

impl EventSpec {
    pub fn to_event(&self) -> KeyEvent {
        match self {
            EventSpec::Key(key) => KeyEvent::new(key.as_str()),
            EventSpec::Detailed {
                key,
                repeat,
                target,
                ctrl,
                shift,
                alt,
                meta,
            } => {
                let mut event = KeyEvent::new(key.as_str())
                    .with_modifiers(Modifiers::new(*ctrl, *shift, *alt, *meta));
                event.repeat = *repeat;
                event.target = target.clone();
                event
            }
        }
    }
}

/// One step of a replay script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Press(EventSpec),
    Release(EventSpec),
    /// Focus lost: forget held-down state
    Blur,
    Map { key: Key, command: Command },
    Unmap(Key),
    Mount,
    Unmount,
}

/// A notification observed during replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub step: usize,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// Held-down state after a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub keys_down: Vec<Key>,
    pub commands_down: Vec<Command>,
}

impl Summary {
    pub fn of(commander: &KeyboardCommander) -> Self {
        Self {
            keys_down: commander.keys_down(),
            commands_down: commander.commands_down(),
        }
    }
}

/// Parse a replay script from YAML
///
/// Steps are written as single-key maps (`- press: a`) rather than YAML
/// tags (`- !press a`), so the enum goes through serde_yaml's singleton map
/// adapter.
pub fn parse_script(yaml: &str) -> Result<Vec<Step>, String> {
    serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(yaml))
        .map_err(|e| format!("Failed to parse script: {}", e))
}

/// Load a replay script from a YAML file
pub fn load_script(path: &Path) -> Result<Vec<Step>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read script {}: {}", path.display(), e))?;
    parse_script(&content)
}

/// Run `steps` against `commander`, delivering key events through `target`
///
/// Stops at the first listener error.
pub fn replay(
    commander: &KeyboardCommander,
    target: &RefCell<EventTarget>,
    steps: &[Step],
) -> Result<Vec<Notification>, CommanderError> {
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let current_step = Rc::new(Cell::new(0usize));

    let recorders: Vec<(CommanderEvent, Listener<str>)> = CommanderEvent::ALL
        .into_iter()
        .map(|event| {
            let recorded = Rc::clone(&recorded);
            let current_step = Rc::clone(&current_step);
            let l = listener(move |payload: Option<&str>| {
                recorded.borrow_mut().push(Notification {
                    step: current_step.get(),
                    event: event.to_string(),
                    payload: payload.map(str::to_string),
                });
                Ok(())
            });
            (event, l)
        })
        .collect();
    for (event, l) in &recorders {
        commander.on(*event, Rc::clone(l));
    }

    let result = run_steps(commander, target, steps, &current_step);

    for (event, l) in &recorders {
        commander.off(*event, l);
    }
    result?;

    let notifications = recorded.borrow().clone();
    Ok(notifications)
}

fn run_steps(
    commander: &KeyboardCommander,
    target: &RefCell<EventTarget>,
    steps: &[Step],
    current_step: &Cell<usize>,
) -> Result<(), CommanderError> {
    for (idx, step) in steps.iter().enumerate() {
        current_step.set(idx);
        tracing::debug!("Replay step {}: {:?}", idx, step);
        match step {
            Step::Press(spec) => {
                let mut event = spec.to_event();
                EventTarget::dispatch(target, KeyEventKind::Press, &mut event)?;
            }
            Step::Release(spec) => {
                let mut event = spec.to_event();
                EventTarget::dispatch(target, KeyEventKind::Release, &mut event)?;
            }
            Step::Blur => commander.clear_down(),
            Step::Map { key, command } => {
                commander.map_key(key.clone(), command.clone())?;
            }
            Step::Unmap(key) => {
                commander.unmap_key(key.as_str())?;
            }
            Step::Mount => commander.mount()?,
            Step::Unmount => commander.unmount()?,
        }
    }
    Ok(())
}
