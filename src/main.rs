use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use keycommander::cli::{CliArgs, CliCommand};
use keycommander::config::CommanderConfig;
use keycommander::keymap::{load_default_keymap, load_keymap_file, Mapping};
use keycommander::script::{load_script, replay, Summary};
use keycommander::{CommanderOptions, EventTarget, KeyboardCommander};

fn load_mapping(path: Option<&Path>) -> Result<Mapping> {
    match path {
        Some(path) => load_keymap_file(path)
            .with_context(|| format!("Failed to load keymap {}", path.display())),
        None => Ok(load_default_keymap()),
    }
}

fn check(keymap: Option<&Path>) -> Result<()> {
    let mapping = load_mapping(keymap)?;
    let target = EventTarget::shared();
    let commander = KeyboardCommander::new(
        mapping,
        CommanderOptions::new()
            .with_input_source(Rc::clone(&target))
            .auto_mount(false),
    )?;

    println!("{} keys mapped:", commander.keys_mapped().len());
    for key in commander.keys_mapped() {
        if let Some(command) = commander.command_for(key.as_str()) {
            println!("  {:?} -> {}", key.as_str(), command);
        }
    }
    let commands = commander.commands();
    println!("{} distinct commands:", commands.len());
    for command in commands {
        println!("  {}", command);
    }
    Ok(())
}

fn run_replay(
    script: &Path,
    keymap: Option<&Path>,
    config: Option<&Path>,
    trigger_on_repeat: bool,
) -> Result<()> {
    let mapping = load_mapping(keymap)?;
    let config = match config {
        Some(path) => CommanderConfig::load_from(path).map_err(anyhow::Error::msg)?,
        None => CommanderConfig::load(),
    };
    let steps = load_script(script).map_err(anyhow::Error::msg)?;

    let target = EventTarget::shared();
    let mut options = config.apply(CommanderOptions::new().with_input_source(Rc::clone(&target)));
    if trigger_on_repeat {
        options = options.trigger_on_repeat(true);
    }
    // Replay always delivers through the target, so it must be attached
    options = options.auto_mount(true);
    let commander = KeyboardCommander::new(mapping, options)?;

    let notifications = replay(&commander, &target, &steps).context("Replay aborted")?;
    for notification in &notifications {
        println!("{}", serde_json::to_string(notification)?);
    }
    println!("{}", serde_json::to_string(&Summary::of(&commander))?);

    commander.unmount()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    keycommander::tracing::init();

    match args.command {
        CliCommand::Check { keymap } => check(keymap.as_deref()),
        CliCommand::Replay {
            script,
            keymap,
            config,
            trigger_on_repeat,
        } => run_replay(&script, keymap.as_deref(), config.as_deref(), trigger_on_repeat),
    }
}
