//! Command registry: the keydown entry point
//!
//! Owns the binding table and the pressed-sequence state. Each keydown is
//! resolved to a canonical keystroke, appended to the pending sequence and
//! matched. Partial matches buffer the raw event; abandoning a partial match
//! (no continuation or timeout) replays the buffered events through the host.

use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use futures::FutureExt;

use super::binding::{BindingId, KeyBinding, KeyBindingOptions};
use super::error::{CommandError, KeymapError};
use super::event::{EventId, KeydownEvent};
use super::hold::{HeldExecution, HoldFuture};
use super::host::{execute_binding, CommandHost};
use super::keystroke::{parse_keystroke_for, Platform};
use super::layout::{keystroke_for_keydown_event_for, KeyboardLayout, KeycodeLayout};
use super::matcher::{match_key_binding, MatchResult};
use super::table::{BindingTable, KeyBindingChanged, KeyBindingHandle};
use crate::config::RegistryConfig;

/// What the registry did with a keydown
#[derive(Debug)]
pub enum KeyAction {
    /// Not a keystroke the registry tracks (unknown key code, bare modifier,
    /// replayed event or disposed registry)
    Ignored,
    /// No binding matches; the event belongs to the host
    NoMatch,
    /// A multi-chord sequence is pending; the event is buffered for replay
    AwaitMore,
    /// The binding's command ran
    Executed(Rc<KeyBinding>),
    /// The binding matched but its command is unregistered or disabled
    Skipped(Rc<KeyBinding>),
    /// The binding matched but holds were registered; run the returned
    /// execution to await them
    Held(HeldExecution),
}

impl KeyAction {
    /// The binding that matched exactly, if any
    pub fn binding(&self) -> Option<&Rc<KeyBinding>> {
        match self {
            KeyAction::Executed(b) | KeyAction::Skipped(b) => Some(b),
            KeyAction::Held(held) => Some(held.binding()),
            _ => None,
        }
    }
}

/// Result of [`CommandRegistry::process_keydown_event`]
#[derive(Debug)]
pub struct KeydownOutcome {
    pub action: KeyAction,
    /// The host should prevent the event's default action and stop propagation
    pub default_prevented: bool,
    /// Buffered events re-dispatched through [`CommandHost::replay_keydown_event`]
    /// because a pending sequence was abandoned
    pub replayed: Vec<EventId>,
}

impl KeydownOutcome {
    fn ignored() -> Self {
        Self {
            action: KeyAction::Ignored,
            default_prevented: false,
            replayed: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct PendingState {
    keystrokes: Vec<String>,
    events: Vec<KeydownEvent>,
    /// Set when entering pending from empty; never extended
    deadline: Option<Instant>,
}

impl PendingState {
    fn is_empty(&self) -> bool {
        self.keystrokes.is_empty()
    }

    fn clear(&mut self) {
        self.keystrokes.clear();
        self.events.clear();
        self.deadline = None;
    }
}

/// Registry of key bindings and the chord-sequence state machine
///
/// Single-threaded: the host serializes keydowns and drives the sequence
/// timeout through [`poll_timeout`](Self::poll_timeout).
pub struct CommandRegistry {
    table: BindingTable,
    layout: Box<dyn KeyboardLayout>,
    host: Rc<dyn CommandHost>,
    platform: Platform,
    timeout: Duration,
    pending: PendingState,
    holds: HashMap<EventId, Vec<HoldFuture>>,
    /// Newest event fed to `process_keydown_event_at`
    last_event: Option<EventId>,
    disposed: bool,
}

impl CommandRegistry {
    /// Registry with the en-US layout and default config
    pub fn new(host: Rc<dyn CommandHost>) -> Self {
        Self::with_config(host, Box::new(KeycodeLayout::en_us()), &RegistryConfig::default())
    }

    pub fn with_config(
        host: Rc<dyn CommandHost>,
        layout: Box<dyn KeyboardLayout>,
        config: &RegistryConfig,
    ) -> Self {
        tracing::debug!(
            layout = layout.name(),
            platform = %config.platform(),
            timeout_ms = config.timeout_ms,
            "command registry created"
        );
        Self {
            table: BindingTable::new(),
            layout,
            host,
            platform: config.platform(),
            timeout: config.timeout(),
            pending: PendingState::default(),
            holds: HashMap::new(),
            last_event: None,
            disposed: false,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn layout(&self) -> &dyn KeyboardLayout {
        &*self.layout
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register a binding
    ///
    /// Fails without registering anything if the selector is invalid, the
    /// sequence is empty or a keystroke has no key.
    pub fn add_key_binding(
        &self,
        options: &KeyBindingOptions,
    ) -> Result<KeyBindingHandle, KeymapError> {
        if self.disposed {
            return Err(KeymapError::Disposed);
        }
        self.warn_unknown_keys(options);
        let handle = self.table.add(options, self.platform)?;
        tracing::trace!(command = %options.command, selector = %options.selector, "key binding added");
        Ok(handle)
    }

    /// Register a batch of bindings; nothing is registered if any is invalid
    pub fn load_keymap(
        &self,
        bindings: &[KeyBindingOptions],
    ) -> Result<Vec<KeyBindingHandle>, KeymapError> {
        if self.disposed {
            return Err(KeymapError::Disposed);
        }
        for options in bindings {
            KeyBinding::from_options(BindingId(0), options, self.platform)?;
        }
        let handles = bindings
            .iter()
            .map(|options| self.add_key_binding(options))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!("Loaded {} key bindings", handles.len());
        Ok(handles)
    }

    fn warn_unknown_keys(&self, options: &KeyBindingOptions) {
        for keystroke in options.keys_for(self.platform) {
            let key = parse_keystroke_for(keystroke, self.platform).key;
            if !key.is_empty() && !self.layout.is_valid_key(&key) {
                tracing::warn!(
                    "Key binding for '{}' uses key '{}' unknown to layout '{}'",
                    options.command,
                    key,
                    self.layout.name()
                );
            }
        }
    }

    /// Registered bindings in registration order
    pub fn key_bindings(&self) -> Vec<Rc<KeyBinding>> {
        self.table.all()
    }

    /// Receive binding added/removed notifications
    pub fn subscribe(&self) -> Receiver<KeyBindingChanged> {
        self.table.subscribe()
    }

    /// Canonical keystrokes of the pending sequence
    pub fn pending_keystrokes(&self) -> &[String] {
        &self.pending.keystrokes
    }

    /// Events that still have holds waiting for a match
    pub fn held_event_count(&self) -> usize {
        self.holds.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the pending sequence will be abandoned, if one is pending
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.deadline
    }

    /// Make execution of any binding matched by `event` wait for `allow`
    ///
    /// Must be called before the event is processed. If any hold for the
    /// matching events resolves to `false` the command does not run. Holds
    /// for events already processed and no longer pending are dropped.
    pub fn hold_key_binding_execution(
        &mut self,
        event: &KeydownEvent,
        allow: impl Future<Output = bool> + 'static,
    ) {
        if self.disposed {
            return;
        }
        let id = event.id();
        let processed = self.last_event.is_some_and(|last| id <= last);
        if processed && !self.pending.events.iter().any(|ev| ev.id() == id) {
            tracing::trace!(event = ?id, "hold registered after its event was processed");
            return;
        }
        self.holds
            .entry(id)
            .or_default()
            .push(allow.boxed_local());
    }

    pub fn process_keydown_event(
        &mut self,
        event: &KeydownEvent,
    ) -> Result<KeydownOutcome, CommandError> {
        self.process_keydown_event_at(event, Instant::now())
    }

    /// Feed one keydown observed at `now`
    ///
    /// A pending sequence whose deadline has passed is abandoned first, so a
    /// late chord starts a new sequence. Command failures from the host are
    /// returned as errors; the sequence state is already reset when that
    /// happens.
    pub fn process_keydown_event_at(
        &mut self,
        event: &KeydownEvent,
        now: Instant,
    ) -> Result<KeydownOutcome, CommandError> {
        if self.disposed || event.is_replay() {
            return Ok(KeydownOutcome::ignored());
        }

        let mut replayed = self.poll_timeout(now);
        self.release_stale_holds(event.id());

        let is_modifier = match self.layout.key_for_keydown_event(event) {
            Some(key) => self.layout.is_modifier_key(&key),
            None => true,
        };
        let keystroke = keystroke_for_keydown_event_for(event, &*self.layout, self.platform);
        if is_modifier || keystroke.is_empty() {
            self.holds.remove(&event.id());
            return Ok(KeydownOutcome {
                replayed,
                ..KeydownOutcome::ignored()
            });
        }

        let bindings = self.table.all();
        let mut pressed = self.pending.keystrokes.clone();
        pressed.push(keystroke.clone());
        let mut result = match_key_binding(&bindings, &pressed, &*event.target);

        if result == MatchResult::NoMatch && !self.pending.is_empty() {
            tracing::debug!(
                pending = %self.pending.keystrokes.join(", "),
                keystroke = %keystroke,
                "abandoning key sequence"
            );
            replayed.extend(self.abandon_pending());
            pressed = vec![keystroke];
            result = match_key_binding(&bindings, &pressed, &*event.target);
        }

        let default_prevented = result.prevents_default();
        let action = match result {
            MatchResult::NoMatch => {
                self.pending.clear();
                self.holds.remove(&event.id());
                KeyAction::NoMatch
            }
            MatchResult::Partial(candidates) => {
                if self.pending.events.is_empty() {
                    self.pending.deadline = Some(now + self.timeout);
                }
                tracing::trace!(
                    pressed = %pressed.join(", "),
                    candidates = candidates.len(),
                    "awaiting next chord"
                );
                self.pending.keystrokes = pressed;
                self.pending.events.push(event.clone());
                KeyAction::AwaitMore
            }
            MatchResult::Exact(binding) => {
                let mut holds = Vec::new();
                for ev in self.pending.events.iter().chain(std::iter::once(event)) {
                    if let Some(h) = self.holds.remove(&ev.id()) {
                        holds.extend(h);
                    }
                }
                self.pending.clear();

                if holds.is_empty() {
                    let ran = execute_binding(
                        &*self.host,
                        &binding.command,
                        &binding.args,
                        &binding.keys,
                    )?;
                    if ran {
                        KeyAction::Executed(binding)
                    } else {
                        KeyAction::Skipped(binding)
                    }
                } else {
                    KeyAction::Held(HeldExecution::new(binding, holds, self.host.clone()))
                }
            }
        };

        Ok(KeydownOutcome {
            action,
            default_prevented,
            replayed,
        })
    }

    /// Abandon the pending sequence if its deadline has passed
    ///
    /// Returns the ids of the replayed events, in their original order.
    pub fn poll_timeout(&mut self, now: Instant) -> Vec<EventId> {
        match self.pending.deadline {
            Some(deadline) if now >= deadline => {
                tracing::debug!(
                    pending = %self.pending.keystrokes.join(", "),
                    "key sequence timed out"
                );
                self.abandon_pending()
            }
            _ => Vec::new(),
        }
    }

    /// Drop holds for events older than both `current` and the pending
    /// sequence; those events can no longer take part in a match
    fn release_stale_holds(&mut self, current: EventId) {
        let floor = match self.pending.events.first() {
            Some(oldest) => oldest.id().min(current),
            None => current,
        };
        self.holds.retain(|id, _| *id >= floor);
        self.last_event = Some(self.last_event.map_or(current, |last| last.max(current)));
    }

    fn abandon_pending(&mut self) -> Vec<EventId> {
        let events = std::mem::take(&mut self.pending.events);
        self.pending.clear();

        let mut ids = Vec::with_capacity(events.len());
        for event in &events {
            self.holds.remove(&event.id());
            self.host.replay_keydown_event(&event.to_replay());
            ids.push(event.id());
        }
        ids
    }

    /// Drop all bindings, holds and pending state without replaying anything
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.pending.clear();
        self.holds.clear();
        self.table.clear();
        tracing::debug!("command registry disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("layout", &self.layout.name())
            .field("platform", &self.platform)
            .field("bindings", &self.table.len())
            .field("pending", &self.pending.keystrokes)
            .field("holds", &self.holds.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
