//! Errors raised by the commander and its notifier

use std::fmt;

/// Errors that can occur while constructing or driving a commander
#[derive(Debug)]
pub enum CommanderError {
    /// Constructed without a usable input source. The instance is not created.
    Configuration(String),
    /// A dynamically typed mapping was not a key → command table.
    /// Nothing was mutated.
    InvalidArgument(String),
    /// A listener failed while an event was being triggered.
    ///
    /// Listeners registered after the failing one were not called for that
    /// trigger. The error is passed through unchanged to whoever caused the
    /// trigger (a key handler, `map_key`, `mount`, ...).
    Listener {
        event: String,
        source: anyhow::Error,
    },
}

impl CommanderError {
    /// Check if this error came from a listener rather than the commander itself
    pub fn is_listener_error(&self) -> bool {
        matches!(self, CommanderError::Listener { .. })
    }
}

impl fmt::Display for CommanderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommanderError::Configuration(e) => write!(f, "Configuration error: {}", e),
            CommanderError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            CommanderError::Listener { event, source } => {
                write!(f, "Listener for '{}' failed: {}", event, source)
            }
        }
    }
}

impl std::error::Error for CommanderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommanderError::Listener { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
