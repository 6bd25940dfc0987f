//! Command-line argument parsing
//!
//! Supports:
//! - Checking a keymap and listing its keys and commands
//! - Replaying a scripted sequence of key events

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Map keyboard keys to application commands
#[derive(Parser, Debug)]
#[command(name = "keycommander", version, about = "Map keyboard keys to commands")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Load a keymap and list its keys and commands
    Check {
        /// Keymap YAML file (defaults: embedded + ./keymap.yaml + user keymap)
        #[arg(short, long, value_name = "PATH")]
        keymap: Option<PathBuf>,
    },
    /// Replay a YAML script of key events and print notifications as JSON lines
    Replay {
        /// Script of press/release steps
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Keymap YAML file (defaults: embedded + ./keymap.yaml + user keymap)
        #[arg(short, long, value_name = "PATH")]
        keymap: Option<PathBuf>,

        /// Config YAML file (default: ~/.config/keycommander/config.yaml)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Dispatch auto-repeat presses too (overrides config)
        #[arg(long)]
        trigger_on_repeat: bool,
    },
}
