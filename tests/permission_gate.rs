//! Held executions, disabled commands and command failures

mod common;

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;
use futures::future::ready;

use chordmap::keymap::{CommandError, KeyAction, KeyBindingOptions, KeymapError};
use common::{bind, keydown, scope, test_registry, RecordingHost};

#[test]
fn test_hold_false_vetoes_execution() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "#x", "save");
    let target = scope(&["input#x", "body"]);

    let event = keydown("Ctrl S", &target);
    registry.hold_key_binding_execution(&event, ready(false));
    let outcome = registry.process_keydown_event(&event).unwrap();

    assert!(outcome.default_prevented);
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert_eq!(held.command(), "save");
    assert_eq!(held.hold_count(), 1);
    assert!(host.executed_commands().is_empty());

    assert_eq!(block_on(held.run()), Ok(false));
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_hold_true_allows_execution() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    let event = keydown("Ctrl S", &target);
    registry.hold_key_binding_execution(&event, ready(true));
    registry.hold_key_binding_execution(&event, async { true });
    let outcome = registry.process_keydown_event(&event).unwrap();

    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert_eq!(held.hold_count(), 2);
    assert_eq!(block_on(held.run()), Ok(true));
    assert_eq!(host.executed_commands(), vec!["save"]);
}

#[test]
fn test_any_false_hold_vetoes() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    let event = keydown("Ctrl S", &target);
    registry.hold_key_binding_execution(&event, ready(true));
    registry.hold_key_binding_execution(&event, ready(false));
    let outcome = registry.process_keydown_event(&event).unwrap();

    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert_eq!(block_on(held.run()), Ok(false));
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_hold_on_earlier_chord_applies_to_sequence() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl K", "Ctrl L"], "*", "fold");
    let target = scope(&["body"]);

    let ctrl_k = keydown("Ctrl K", &target);
    registry.hold_key_binding_execution(&ctrl_k, ready(false));
    let outcome = registry.process_keydown_event(&ctrl_k).unwrap();
    assert!(matches!(outcome.action, KeyAction::AwaitMore));

    let outcome = registry
        .process_keydown_event(&keydown("Ctrl L", &target))
        .unwrap();
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert_eq!(block_on(held.run()), Ok(false));
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_held_execution_uses_args_snapshot() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    let handle = registry
        .add_key_binding(
            &KeyBindingOptions::new("Ctrl S", "*", "save").args(serde_json::json!({ "n": 1 })),
        )
        .unwrap();
    let target = scope(&["body"]);

    let event = keydown("Ctrl S", &target);
    registry.hold_key_binding_execution(&event, ready(true));
    let outcome = registry.process_keydown_event(&event).unwrap();
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };

    // Registry state moves on while the hold is pending
    handle.dispose();
    registry
        .process_keydown_event(&keydown("Ctrl S", &target))
        .unwrap();

    assert_eq!(block_on(held.run()), Ok(true));
    let executed = host.executed.borrow();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].1["n"], 1);
}

#[test]
fn test_hold_resolves_after_later_keydowns() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    let approved = Rc::new(Cell::new(false));
    let gate = approved.clone();
    let event = keydown("Ctrl S", &target);
    registry.hold_key_binding_execution(&event, async move { gate.get() });
    let outcome = registry.process_keydown_event(&event).unwrap();
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };

    approved.set(true);
    assert_eq!(block_on(held.run()), Ok(true));
    assert_eq!(host.executed_commands(), vec!["save"]);
}

#[test]
fn test_holds_after_processing_are_not_kept() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    for _ in 0..100 {
        let event = keydown("Ctrl S", &target);
        registry.process_keydown_event(&event).unwrap();
        registry.hold_key_binding_execution(&event, ready(false));
    }
    assert_eq!(registry.held_event_count(), 0);

    // None of the late holds vetoes a later match
    let outcome = registry
        .process_keydown_event(&keydown("Ctrl S", &target))
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::Executed(_)));
    assert_eq!(host.executed_commands().len(), 101);
}

#[test]
fn test_holds_for_skipped_events_are_released() {
    let (_, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    // Held events the host never feeds in
    for _ in 0..10 {
        registry.hold_key_binding_execution(&keydown("Ctrl S", &target), ready(true));
    }
    assert_eq!(registry.held_event_count(), 10);

    registry
        .process_keydown_event(&keydown("Ctrl X", &target))
        .unwrap();
    assert_eq!(registry.held_event_count(), 0);
}

#[test]
fn test_hold_on_pending_event_is_kept() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl K", "Ctrl L"], "*", "fold");
    let target = scope(&["body"]);

    let ctrl_k = keydown("Ctrl K", &target);
    registry.process_keydown_event(&ctrl_k).unwrap();
    registry.hold_key_binding_execution(&ctrl_k, ready(false));
    assert_eq!(registry.held_event_count(), 1);

    let outcome = registry
        .process_keydown_event(&keydown("Ctrl L", &target))
        .unwrap();
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert_eq!(block_on(held.run()), Ok(false));
    assert!(host.executed_commands().is_empty());
    assert_eq!(registry.held_event_count(), 0);
}

// ========================================================================
// Commands the host cannot run
// ========================================================================

#[test]
fn test_disabled_command_is_skipped() {
    let mut host = RecordingHost::default();
    host.disabled.insert("save".to_string());
    let (host, mut registry) = test_registry(host);
    bind(&registry, &["Ctrl S"], "*", "save");

    let outcome = registry
        .process_keydown_event(&keydown("Ctrl S", &scope(&["body"])))
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::Skipped(ref b) if b.command == "save"));
    assert!(outcome.default_prevented);
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_unregistered_command_is_skipped() {
    let mut host = RecordingHost::default();
    host.missing.insert("save".to_string());
    let (host, mut registry) = test_registry(host);
    bind(&registry, &["Ctrl S"], "*", "save");

    let outcome = registry
        .process_keydown_event(&keydown("Ctrl S", &scope(&["body"])))
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::Skipped(_)));
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_command_failure_propagates() {
    let mut host = RecordingHost::default();
    host.failing.insert("save".to_string());
    let (_, mut registry) = test_registry(host);
    bind(&registry, &["Ctrl K", "Ctrl S"], "*", "save");
    let target = scope(&["body"]);

    registry
        .process_keydown_event(&keydown("Ctrl K", &target))
        .unwrap();
    let err = registry
        .process_keydown_event(&keydown("Ctrl S", &target))
        .unwrap_err();
    assert!(matches!(err, CommandError::Failed { ref command, .. } if command == "save"));
    assert!(!registry.has_pending());
}

#[test]
fn test_held_command_failure_propagates() {
    let mut host = RecordingHost::default();
    host.failing.insert("save".to_string());
    let (_, mut registry) = test_registry(host);
    bind(&registry, &["Ctrl S"], "*", "save");

    let event = keydown("Ctrl S", &scope(&["body"]));
    registry.hold_key_binding_execution(&event, ready(true));
    let outcome = registry.process_keydown_event(&event).unwrap();
    let KeyAction::Held(held) = outcome.action else {
        panic!("expected a held execution");
    };
    assert!(block_on(held.run()).is_err());
}

// ========================================================================
// Registration errors
// ========================================================================

#[test]
fn test_invalid_selector_rejected_atomically() {
    let (_, registry) = test_registry(RecordingHost::default());
    let changes = registry.subscribe();

    let err = registry
        .add_key_binding(&KeyBindingOptions::new("Ctrl S", "..", "save"))
        .unwrap_err();
    assert!(matches!(err, KeymapError::InvalidSelector { .. }));
    assert!(registry.key_bindings().is_empty());
    assert!(changes.try_recv().is_err());
}

#[test]
fn test_keystroke_without_key_rejected() {
    let (_, registry) = test_registry(RecordingHost::default());
    let err = registry
        .add_key_binding(&KeyBindingOptions::chord(&["Ctrl K", "Ctrl Shift"], "*", "x"))
        .unwrap_err();
    assert!(matches!(err, KeymapError::NoKey(_)));
    assert!(registry.key_bindings().is_empty());
}

#[test]
fn test_load_keymap_is_all_or_nothing() {
    let (_, registry) = test_registry(RecordingHost::default());
    let bindings = vec![
        KeyBindingOptions::new("Ctrl S", "*", "save"),
        KeyBindingOptions::new("Ctrl O", "div[", "open"),
    ];
    assert!(registry.load_keymap(&bindings).is_err());
    assert!(registry.key_bindings().is_empty());
}
