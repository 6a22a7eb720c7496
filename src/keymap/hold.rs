//! Permission gate: callers may hold a matched binding's execution until a
//! future decides whether it may run

use std::fmt;
use std::rc::Rc;

use futures::future::{join_all, LocalBoxFuture};
use serde_json::Value;

use super::binding::KeyBinding;
use super::error::CommandError;
use super::host::{execute_binding, CommandHost};

/// A veto-capable permission registered for one keydown event
pub type HoldFuture = LocalBoxFuture<'static, bool>;

/// An exact match whose execution waits on one or more holds
///
/// The command, args and keys are a snapshot taken when the match fired; later
/// keydowns do not affect it.
pub struct HeldExecution {
    binding: Rc<KeyBinding>,
    command: String,
    args: Value,
    keys: Vec<String>,
    holds: Vec<HoldFuture>,
    host: Rc<dyn CommandHost>,
}

impl HeldExecution {
    pub(crate) fn new(binding: Rc<KeyBinding>, holds: Vec<HoldFuture>, host: Rc<dyn CommandHost>) -> Self {
        Self {
            command: binding.command.clone(),
            args: binding.args.clone(),
            keys: binding.keys.clone(),
            binding,
            holds,
            host,
        }
    }

    pub fn binding(&self) -> &Rc<KeyBinding> {
        &self.binding
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn hold_count(&self) -> usize {
        self.holds.len()
    }

    /// Await every hold; execute only if all of them allow it
    ///
    /// Returns `Ok(true)` if the command ran.
    pub async fn run(self) -> Result<bool, CommandError> {
        let approvals = join_all(self.holds).await;
        if !approvals.into_iter().all(|allowed| allowed) {
            tracing::debug!(command = %self.command, "key binding execution vetoed by hold");
            return Ok(false);
        }
        execute_binding(&*self.host, &self.command, &self.args, &self.keys)
    }
}

impl fmt::Debug for HeldExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeldExecution")
            .field("command", &self.command)
            .field("keys", &self.keys)
            .field("holds", &self.holds.len())
            .finish()
    }
}
