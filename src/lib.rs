//! keycommander - keyboard key → application command translation
//!
//! This crate sits between a raw keyboard input source and an application's
//! command layer: keys are looked up in a mapping table, and listeners are
//! notified with `command` or `missingCommand` on every press. Held-down
//! state for keys and commands is tracked alongside for polling consumers.
//!
//! ```ignore
//! let target = EventTarget::shared();
//! let commander = KeyboardCommander::new(
//!     mapping_from([("a", "move-left")]),
//!     CommanderOptions::new()
//!         .with_input_source(Rc::clone(&target))
//!         .on(CommanderEvent::Command, listener(|cmd| { println!("{:?}", cmd); Ok(()) })),
//! )?;
//! EventTarget::press(&target, "a")?;
//! assert!(commander.is_command_down("move-left"));
//! ```

pub mod cli;
pub mod commander;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod keymap;
pub mod notifier;
pub mod script;
pub mod source;
pub mod state;
pub mod tracing;

// Re-export commonly used types
pub use commander::{CommanderEvent, CommanderOptions, KeyboardCommander, WeakCommander};
pub use config::CommanderConfig;
pub use error::CommanderError;
pub use keymap::{Command, Key, Mapping, MappingTable};
pub use notifier::{listener, Listener, Notifier};
pub use source::{EventTarget, InputSource, KeyEvent, KeyEventKind, KeyHandler, Modifiers};
pub use state::DownState;
