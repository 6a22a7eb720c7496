//! Keydown event description handed to the registry by the host

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::scope::ScopeChain;

/// Identity of one raw keydown event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

impl EventId {
    fn next() -> Self {
        EventId(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A raw keydown: virtual key code, modifier flags and the scope chain of the
/// focused target
#[derive(Clone)]
pub struct KeydownEvent {
    id: EventId,
    /// Virtual key code, resolved to a key name by a [`KeyboardLayout`](super::KeyboardLayout)
    pub key_code: u32,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Cmd on macOS, Win/Super elsewhere
    pub meta: bool,
    pub target: Rc<dyn ScopeChain>,
    replayed: bool,
}

impl KeydownEvent {
    pub fn new(key_code: u32, target: Rc<dyn ScopeChain>) -> Self {
        Self {
            id: EventId::next(),
            key_code,
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            target,
            replayed: false,
        }
    }

    /// Set all modifier flags at once
    pub fn with_modifiers(mut self, ctrl: bool, alt: bool, shift: bool, meta: bool) -> Self {
        self.ctrl = ctrl;
        self.alt = alt;
        self.shift = shift;
        self.meta = meta;
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// True for events re-dispatched by the registry after an abandoned sequence
    pub fn is_replay(&self) -> bool {
        self.replayed
    }

    /// Copy of this event marked as a replay, keeping its identity
    pub(crate) fn to_replay(&self) -> Self {
        Self {
            replayed: true,
            ..self.clone()
        }
    }
}

impl fmt::Debug for KeydownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeydownEvent")
            .field("id", &self.id)
            .field("key_code", &self.key_code)
            .field("ctrl", &self.ctrl)
            .field("alt", &self.alt)
            .field("shift", &self.shift)
            .field("meta", &self.meta)
            .field("target", &self.target.describe())
            .field("replayed", &self.replayed)
            .finish()
    }
}
