//! Dispatch scenarios: presses, repeats, releases and target filtering
//! driven through an attached input source.

mod common;

use common::{move_left_commander, test_commander};
use keycommander::keymap::mapping_from;
use keycommander::{
    CommanderEvent, EventTarget, Key, KeyEvent, KeyEventKind, Mapping,
};

// ========================================================================
// Press / Release
// ========================================================================

#[test]
fn test_press_mapped_key_emits_single_command() {
    let (commander, target, recorder) = move_left_commander();

    EventTarget::press(&target, "a").unwrap();

    assert_eq!(
        recorder.payloads(CommanderEvent::Command),
        vec![Some("move-left".to_string())]
    );
    assert_eq!(recorder.count(CommanderEvent::MissingCommand), 0);
    assert!(commander.is_key_down("a"));
    assert!(commander.is_command_down("move-left"));
}

#[test]
fn test_repeat_press_emits_nothing_more() {
    let (commander, target, recorder) = move_left_commander();
    EventTarget::press(&target, "a").unwrap();
    let keys_before = commander.keys_down();
    let commands_before = commander.commands_down();

    for _ in 0..10 {
        let mut event = KeyEvent::new("a").repeating();
        EventTarget::dispatch(&target, KeyEventKind::Press, &mut event).unwrap();
    }

    assert_eq!(recorder.count(CommanderEvent::Command), 1);
    assert_eq!(commander.keys_down(), keys_before);
    assert_eq!(commander.commands_down(), commands_before);
}

#[test]
fn test_repeat_press_dispatches_with_trigger_on_repeat() {
    let (_commander, target, recorder) = test_commander(mapping_from([("a", "move-left")]), true);

    EventTarget::press(&target, "a").unwrap();
    let mut event = KeyEvent::new("a").repeating();
    EventTarget::dispatch(&target, KeyEventKind::Press, &mut event).unwrap();

    assert_eq!(recorder.count(CommanderEvent::Command), 2);
}

#[test]
fn test_unmapped_key_emits_missing_command() {
    let (_commander, target, recorder) = test_commander(Mapping::new(), false);

    EventTarget::press(&target, "z").unwrap();

    assert_eq!(
        recorder.payloads(CommanderEvent::MissingCommand),
        vec![Some("z".to_string())]
    );
    assert_eq!(recorder.count(CommanderEvent::Command), 0);
}

#[test]
fn test_press_then_release_transitions_state() {
    let (commander, target, _recorder) = move_left_commander();

    EventTarget::press(&target, "a").unwrap();
    assert!(commander.is_key_down("a"));
    assert!(commander.is_command_down("move-left"));

    EventTarget::release(&target, "a").unwrap();
    assert!(!commander.is_key_down("a"));
    assert!(!commander.is_command_down("move-left"));
}

#[test]
fn test_release_emits_no_notification() {
    let (_commander, target, recorder) = move_left_commander();
    EventTarget::press(&target, "a").unwrap();
    recorder.clear();

    EventTarget::release(&target, "a").unwrap();

    assert!(recorder.is_empty());
}

// ========================================================================
// Target filtering
// ========================================================================

#[test]
fn test_press_on_input_target_does_nothing() {
    let (commander, target, recorder) = move_left_commander();

    let mut event = KeyEvent::new("a").on_target("INPUT");
    EventTarget::dispatch(&target, KeyEventKind::Press, &mut event).unwrap();

    assert!(recorder.is_empty());
    assert!(commander.keys_down().is_empty());
    assert!(commander.commands_down().is_empty());
}

#[test]
fn test_press_on_textarea_target_does_nothing() {
    let (commander, target, recorder) = move_left_commander();

    let mut event = KeyEvent::new("a").on_target("TEXTAREA");
    EventTarget::dispatch(&target, KeyEventKind::Press, &mut event).unwrap();

    assert!(recorder.is_empty());
    assert!(!commander.is_key_down("a"));
}

#[test]
fn test_press_on_other_target_suppresses_default() {
    let (_commander, target, recorder) = move_left_commander();

    let mut event = KeyEvent::new("a").on_target("BODY");
    EventTarget::dispatch(&target, KeyEventKind::Press, &mut event).unwrap();

    assert!(event.default_prevented());
    assert_eq!(recorder.count(CommanderEvent::Command), 1);
}

#[test]
fn test_release_on_filtered_target_is_safe() {
    let (commander, target, _recorder) = move_left_commander();

    let mut event = KeyEvent::new("a").on_target("INPUT");
    EventTarget::dispatch(&target, KeyEventKind::Release, &mut event).unwrap();

    assert!(!commander.is_key_down("a"));
    assert!(commander.keys_down().is_empty());
}

// ========================================================================
// Held-down queries
// ========================================================================

#[test]
fn test_multiple_keys_held() {
    let (commander, target, _recorder) = test_commander(
        mapping_from([("a", "move-left"), ("w", "move-up"), (" ", "jump")]),
        false,
    );

    EventTarget::press(&target, "a").unwrap();
    EventTarget::press(&target, "w").unwrap();
    EventTarget::press(&target, "x").unwrap();

    assert_eq!(
        commander.keys_down(),
        vec![Key::from("a"), Key::from("w"), Key::from("x")]
    );
    let commands: Vec<String> = commander
        .commands_down()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(commands, vec!["move-left", "move-up"]);
}

#[test]
fn test_clear_down_after_blur() {
    let (commander, target, _recorder) = move_left_commander();
    EventTarget::press(&target, "a").unwrap();
    EventTarget::press(&target, "b").unwrap();

    commander.clear_down();

    assert!(commander.keys_down().is_empty());
    assert!(commander.commands_down().is_empty());

    // A key-up that arrives late is harmless
    EventTarget::release(&target, "a").unwrap();
    assert!(commander.keys_down().is_empty());
}

// ========================================================================
// Lifecycle
// ========================================================================

#[test]
fn test_unmounted_commander_ignores_events() {
    let (commander, target, recorder) = move_left_commander();

    commander.unmount().unwrap();
    EventTarget::press(&target, "a").unwrap();

    assert_eq!(recorder.count(CommanderEvent::Unmount), 1);
    assert_eq!(recorder.count(CommanderEvent::Command), 0);
    assert!(!commander.is_key_down("a"));

    commander.mount().unwrap();
    EventTarget::press(&target, "a").unwrap();
    assert_eq!(recorder.count(CommanderEvent::Mount), 1);
    assert_eq!(recorder.count(CommanderEvent::Command), 1);
}

#[test]
fn test_repeated_mount_handles_events_twice() {
    let (commander, target, recorder) = move_left_commander();

    commander.mount().unwrap();
    EventTarget::press(&target, "a").unwrap();

    assert_eq!(recorder.count(CommanderEvent::Command), 2);
}
