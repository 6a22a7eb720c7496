//! The application side of the registry: command lookup, execution and
//! keydown re-dispatch

use serde_json::Value;

use super::error::CommandError;
use super::event::KeydownEvent;

/// Commands and event dispatch owned by the embedding application
///
/// Methods take `&self`; hosts keep their mutable state behind `Cell`/`RefCell`
/// since the registry shares the host with held executions.
pub trait CommandHost {
    fn has_command(&self, id: &str) -> bool;

    fn is_enabled(&self, id: &str, args: &Value) -> bool {
        let _ = args;
        self.has_command(id)
    }

    fn execute(&self, id: &str, args: &Value) -> Result<(), CommandError>;

    /// Re-dispatch a keydown the registry intercepted but did not consume.
    /// The event is flagged with [`KeydownEvent::is_replay`].
    fn replay_keydown_event(&self, event: &KeydownEvent);
}

/// Run a matched binding's command if the host has it enabled
///
/// Returns `Ok(false)` when the command is skipped.
pub(crate) fn execute_binding(
    host: &dyn CommandHost,
    command: &str,
    args: &Value,
    keys: &[String],
) -> Result<bool, CommandError> {
    let registered = host.has_command(command);
    if !registered || !host.is_enabled(command, args) {
        let word = if registered { "enabled" } else { "registered" };
        tracing::warn!(
            "Cannot execute key binding '{}': command '{}' is not {}",
            keys.join(", "),
            command,
            word
        );
        return Ok(false);
    }

    tracing::debug!(command, keys = %keys.join(", "), "executing key binding");
    host.execute(command, args)?;
    Ok(true)
}
