//! chordmap - keystroke normalization and multi-chord key binding matching
//!
//! This crate provides a command registry that turns raw keydown events into
//! canonical keystrokes and matches them against selector-scoped chord
//! sequences.

pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use config::RegistryConfig;
pub use keymap::{
    CommandHost, CommandRegistry, KeyAction, KeyBindingOptions, KeydownEvent, KeydownOutcome,
    Platform, ScopePath,
};
