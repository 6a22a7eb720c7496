//! Error types for keymap registration, loading and command execution

use thiserror::Error;

/// Errors raised while registering or loading key bindings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("keystroke has no key: {0:?}")]
    NoKey(String),
    #[error("key binding for '{0}' has an empty key sequence")]
    EmptySequence(String),
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("command registry has been disposed")]
    Disposed,
}

/// Errors reported by a [`CommandHost`](super::CommandHost) when executing a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command '{0}' is not registered")]
    NotRegistered(String),
    #[error("command '{command}' failed: {message}")]
    Failed { command: String, message: String },
}
