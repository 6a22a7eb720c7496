//! Sequence timeout, replay and registry disposal tests

mod common;

use std::time::{Duration, Instant};

use chordmap::keymap::{KeyAction, KeyBindingChanged, KeyBindingOptions, KeymapError};
use common::{bind, keydown, scope, test_registry, RecordingHost};

#[test]
fn test_timeout_replays_pending_event() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "#x", "delete-line");
    let target = scope(&["div#x", "body"]);

    let t0 = Instant::now();
    let d = keydown("D", &target);
    let outcome = registry.process_keydown_event_at(&d, t0).unwrap();
    assert!(matches!(outcome.action, KeyAction::AwaitMore));
    assert!(host.replayed.borrow().is_empty());

    let replayed = registry.poll_timeout(t0 + Duration::from_millis(1300));
    assert_eq!(replayed, vec![d.id()]);
    assert_eq!(host.replayed_ids(), vec![d.id()]);
    assert!(host.executed_commands().is_empty());
    assert!(!registry.has_pending());
}

#[test]
fn test_timeout_replays_exactly_once() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "*", "delete-line");
    let target = scope(&["body"]);

    let t0 = Instant::now();
    registry
        .process_keydown_event_at(&keydown("D", &target), t0)
        .unwrap();
    registry.poll_timeout(t0 + Duration::from_millis(1300));
    assert!(registry.poll_timeout(t0 + Duration::from_millis(2600)).is_empty());
    assert_eq!(host.replayed.borrow().len(), 1);
}

#[test]
fn test_second_chord_within_timeout_fires() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "*", "delete-line");
    let target = scope(&["body"]);

    let t0 = Instant::now();
    registry
        .process_keydown_event_at(&keydown("D", &target), t0)
        .unwrap();
    assert!(registry
        .poll_timeout(t0 + Duration::from_millis(500))
        .is_empty());
    registry
        .process_keydown_event_at(&keydown("D", &target), t0 + Duration::from_millis(900))
        .unwrap();

    assert_eq!(host.executed_commands(), vec!["delete-line"]);
    assert_eq!(registry.next_deadline(), None);
    assert!(registry
        .poll_timeout(t0 + Duration::from_millis(5000))
        .is_empty());
    assert!(host.replayed.borrow().is_empty());
}

#[test]
fn test_keydown_after_timeout_starts_fresh() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "*", "delete-line");
    let target = scope(&["body"]);

    let t0 = Instant::now();
    registry
        .process_keydown_event_at(&keydown("D", &target), t0)
        .unwrap();
    registry.poll_timeout(t0 + Duration::from_millis(1300));

    let late = t0 + Duration::from_millis(1400);
    let outcome = registry
        .process_keydown_event_at(&keydown("D", &target), late)
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::AwaitMore));
    assert_eq!(registry.next_deadline(), Some(late + Duration::from_millis(1000)));
    assert!(host.executed_commands().is_empty());
}

#[test]
fn test_late_chord_without_poll_starts_fresh() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl K", "Ctrl L"], "*", "fold");
    let target = scope(&["body"]);

    let t0 = Instant::now();
    let ctrl_k = keydown("Ctrl K", &target);
    registry.process_keydown_event_at(&ctrl_k, t0).unwrap();

    // The host never polled; the keydown itself notices the expired deadline
    let outcome = registry
        .process_keydown_event_at(&keydown("Ctrl L", &target), t0 + Duration::from_millis(5000))
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::NoMatch));
    assert!(!outcome.default_prevented);
    assert_eq!(outcome.replayed, vec![ctrl_k.id()]);
    assert_eq!(host.replayed_ids(), vec![ctrl_k.id()]);
    assert!(host.executed_commands().is_empty());
    assert!(!registry.has_pending());
}

#[test]
fn test_late_first_chord_opens_new_sequence() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "*", "delete-line");
    let target = scope(&["body"]);

    let t0 = Instant::now();
    let first = keydown("D", &target);
    registry.process_keydown_event_at(&first, t0).unwrap();

    let late = t0 + Duration::from_millis(1500);
    let outcome = registry
        .process_keydown_event_at(&keydown("D", &target), late)
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::AwaitMore));
    assert_eq!(outcome.replayed, vec![first.id()]);
    assert_eq!(registry.next_deadline(), Some(late + Duration::from_millis(1000)));

    registry
        .process_keydown_event_at(&keydown("D", &target), late + Duration::from_millis(200))
        .unwrap();
    assert_eq!(host.executed_commands(), vec!["delete-line"]);
}

#[test]
fn test_replay_preserves_event_order() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["G", "G", "G"], "*", "triple");
    let target = scope(&["body"]);

    let first = keydown("G", &target);
    let second = keydown("G", &target);
    registry.process_keydown_event(&first).unwrap();
    registry.process_keydown_event(&second).unwrap();
    let outcome = registry
        .process_keydown_event(&keydown("H", &target))
        .unwrap();

    assert_eq!(outcome.replayed, vec![first.id(), second.id()]);
    assert_eq!(host.replayed_ids(), vec![first.id(), second.id()]);
}

#[test]
fn test_replayed_event_keeps_key_and_modifiers() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["Ctrl Shift K", "Ctrl L"], "*", "fold");
    let target = scope(&["body"]);

    let event = keydown("Ctrl Shift K", &target);
    registry.process_keydown_event(&event).unwrap();
    registry.poll_timeout(Instant::now() + Duration::from_secs(5));

    let replayed = host.replayed.borrow();
    assert_eq!(replayed[0].key_code, event.key_code);
    assert!(replayed[0].ctrl && replayed[0].shift);
    assert!(!replayed[0].alt && !replayed[0].meta);
}

// ========================================================================
// Disposal
// ========================================================================

#[test]
fn test_dispose_drops_pending_without_replay() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    bind(&registry, &["D", "D"], "*", "delete-line");
    let target = scope(&["body"]);
    let changes = registry.subscribe();

    let t0 = Instant::now();
    registry
        .process_keydown_event_at(&keydown("D", &target), t0)
        .unwrap();
    registry.dispose();

    assert!(registry.is_disposed());
    assert!(!registry.has_pending());
    assert_eq!(registry.next_deadline(), None);
    assert!(registry
        .poll_timeout(t0 + Duration::from_millis(1300))
        .is_empty());
    assert!(host.replayed.borrow().is_empty());
    assert!(registry.key_bindings().is_empty());

    let removed: Vec<_> = changes.try_iter().collect();
    assert!(matches!(&removed[..], [KeyBindingChanged::Removed(b)] if b.command == "delete-line"));
}

#[test]
fn test_disposed_registry_rejects_and_ignores() {
    let (host, mut registry) = test_registry(RecordingHost::default());
    registry.dispose();

    let result = registry.add_key_binding(&KeyBindingOptions::new("Ctrl S", "*", "save"));
    assert_eq!(result.unwrap_err(), KeymapError::Disposed);

    let outcome = registry
        .process_keydown_event(&keydown("Ctrl S", &scope(&["body"])))
        .unwrap();
    assert!(matches!(outcome.action, KeyAction::Ignored));
    assert!(host.executed_commands().is_empty());

    // Second dispose is a no-op
    registry.dispose();
}
