//! Keystroke normalization and multi-chord key binding matching
//!
//! This module provides a command registry that:
//! - Normalizes keystroke strings to a canonical modifier order
//! - Scopes bindings to selectors matched against the focused target's scope chain
//! - Matches multi-chord sequences incrementally, with timeout and replay
//! - Lets callers hold a matched binding's execution behind a veto future
//!
//! # Architecture
//!
//! ```text
//! KeydownEvent → KeyboardLayout → canonical keystroke → match_key_binding() → CommandHost::execute
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = CommandRegistry::new(host);
//! registry.add_key_binding(&KeyBindingOptions::chord(&["Accel K", "Accel L"], ".editor", "editor:fold"))?;
//!
//! let outcome = registry.process_keydown_event(&event)?;
//! if outcome.default_prevented {
//!     // stop propagation in the host
//! }
//! ```

mod binding;
mod config;
mod error;
mod event;
mod hold;
mod host;
mod keystroke;
mod layout;
mod matcher;
mod registry;
mod scope;
mod selector;
mod table;
#[cfg(feature = "winit")]
mod winit_adapter;

pub use binding::{BindingId, KeyBinding, KeyBindingOptions};
pub use config::{
    load_keymap_file, parse_keymap_yaml, parse_keymap_yaml_for, BindingConfig, KeymapConfig,
};
pub use error::{CommandError, KeymapError};
pub use event::{EventId, KeydownEvent};
pub use hold::{HeldExecution, HoldFuture};
pub use host::CommandHost;
pub use keystroke::{
    format_keystroke, format_keystroke_for, format_keystrokes, format_keystrokes_for,
    normalize_keystroke, normalize_keystroke_for, parse_keystroke, parse_keystroke_for,
    KeystrokeParts, Platform,
};
pub use layout::{
    keystroke_for_keydown_event, keystroke_for_keydown_event_for, KeyboardLayout, KeycodeLayout,
};
pub use matcher::{match_key_binding, match_sequence, target_distance, MatchResult, SequenceMatch};
pub use registry::{CommandRegistry, KeyAction, KeydownOutcome};
pub use scope::{ScopeChain, ScopeNode, ScopePath};
pub use selector::{Selector, Specificity};
pub use table::{BindingTable, KeyBindingChanged, KeyBindingHandle};
#[cfg(feature = "winit")]
pub use winit_adapter::{keydown_event_from_winit, virtual_key_code};
