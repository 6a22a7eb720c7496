//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde_json::Value;

use chordmap::config::RegistryConfig;
use chordmap::keymap::{
    CommandError, CommandHost, CommandRegistry, EventId, KeyBindingOptions, KeycodeLayout,
    KeydownEvent, Platform, ScopeChain, ScopePath,
};

/// Host that records executions and replays
#[derive(Default)]
pub struct RecordingHost {
    pub missing: HashSet<String>,
    pub disabled: HashSet<String>,
    pub failing: HashSet<String>,
    pub executed: RefCell<Vec<(String, Value)>>,
    pub replayed: RefCell<Vec<KeydownEvent>>,
}

impl RecordingHost {
    pub fn executed_commands(&self) -> Vec<String> {
        self.executed.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn replayed_ids(&self) -> Vec<EventId> {
        self.replayed.borrow().iter().map(|e| e.id()).collect()
    }
}

impl CommandHost for RecordingHost {
    fn has_command(&self, id: &str) -> bool {
        !self.missing.contains(id)
    }

    fn is_enabled(&self, id: &str, _args: &Value) -> bool {
        self.has_command(id) && !self.disabled.contains(id)
    }

    fn execute(&self, id: &str, args: &Value) -> Result<(), CommandError> {
        if self.failing.contains(id) {
            return Err(CommandError::Failed {
                command: id.to_string(),
                message: "boom".to_string(),
            });
        }
        self.executed
            .borrow_mut()
            .push((id.to_string(), args.clone()));
        Ok(())
    }

    fn replay_keydown_event(&self, event: &KeydownEvent) {
        self.replayed.borrow_mut().push(event.clone());
    }
}

pub const PLATFORM: Platform = Platform::Linux;

/// Registry on Linux with the en-US layout and a 1000ms sequence timeout
pub fn test_registry(host: RecordingHost) -> (Rc<RecordingHost>, CommandRegistry) {
    let host = Rc::new(host);
    let config = RegistryConfig {
        timeout_ms: 1000,
        platform: Some(PLATFORM),
    };
    let registry =
        CommandRegistry::with_config(host.clone(), Box::new(KeycodeLayout::en_us()), &config);
    (host, registry)
}

/// Scope chain from innermost node outwards, e.g. `["input#x", "div.panel", "body"]`
pub fn scope(nodes: &[&str]) -> Rc<dyn ScopeChain> {
    Rc::new(ScopePath::from_innermost(nodes).expect("valid scope nodes"))
}

/// Keydown for `keystroke` on `target` as the en-US layout would report it
pub fn keydown(keystroke: &str, target: &Rc<dyn ScopeChain>) -> KeydownEvent {
    KeycodeLayout::en_us()
        .keydown_event(keystroke, target.clone(), PLATFORM)
        .expect("key on layout")
}

pub fn bind(registry: &CommandRegistry, keys: &[&str], selector: &str, command: &str) {
    registry
        .add_key_binding(&KeyBindingOptions::chord(keys, selector, command))
        .expect("valid binding");
}
