//! Binding table: ordered storage of registered key bindings with change
//! notifications

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};

use super::binding::{BindingId, KeyBinding, KeyBindingOptions};
use super::error::KeymapError;
use super::keystroke::Platform;

/// A change to the binding table
#[derive(Debug, Clone, PartialEq)]
pub enum KeyBindingChanged {
    Added(Rc<KeyBinding>),
    Removed(Rc<KeyBinding>),
}

#[derive(Debug, Default)]
struct TableState {
    bindings: Vec<Rc<KeyBinding>>,
    next_id: u64,
    subscribers: Vec<Sender<KeyBindingChanged>>,
}

impl TableState {
    fn notify(&mut self, change: KeyBindingChanged) {
        // Drop subscribers whose receiver is gone
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Registration-ordered key bindings
#[derive(Debug, Default)]
pub struct BindingTable {
    state: Rc<RefCell<TableState>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, normalize and store a binding
    pub fn add(
        &self,
        options: &KeyBindingOptions,
        platform: Platform,
    ) -> Result<KeyBindingHandle, KeymapError> {
        let mut state = self.state.borrow_mut();
        let id = BindingId(state.next_id);
        let binding = Rc::new(KeyBinding::from_options(id, options, platform)?);
        state.next_id += 1;
        state.bindings.push(binding.clone());
        state.notify(KeyBindingChanged::Added(binding));

        Ok(KeyBindingHandle {
            id,
            table: Rc::downgrade(&self.state),
        })
    }

    /// Snapshot of all bindings in registration order
    pub fn all(&self) -> Vec<Rc<KeyBinding>> {
        self.state.borrow().bindings.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().bindings.is_empty()
    }

    /// Receive every subsequent add/remove
    pub fn subscribe(&self) -> Receiver<KeyBindingChanged> {
        let (tx, rx) = mpsc::channel();
        self.state.borrow_mut().subscribers.push(tx);
        rx
    }

    /// Remove every binding, notifying each removal, then drop subscribers
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        let removed = std::mem::take(&mut state.bindings);
        for binding in removed {
            state.notify(KeyBindingChanged::Removed(binding));
        }
        state.subscribers.clear();
    }
}

/// Disposal handle returned by [`BindingTable::add`]
///
/// Dropping the handle keeps the binding registered; call [`dispose`](Self::dispose)
/// to remove it.
#[derive(Debug, Clone)]
pub struct KeyBindingHandle {
    id: BindingId,
    table: Weak<RefCell<TableState>>,
}

impl KeyBindingHandle {
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Remove the binding. Returns false if it was already gone.
    pub fn dispose(&self) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let mut state = table.borrow_mut();
        let Some(idx) = state.bindings.iter().position(|b| b.id == self.id) else {
            return false;
        };
        let binding = state.bindings.remove(idx);
        state.notify(KeyBindingChanged::Removed(binding));
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.table
            .upgrade()
            .map_or(true, |t| !t.borrow().bindings.iter().any(|b| b.id == self.id))
    }
}
