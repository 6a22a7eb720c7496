//! Matching a pressed keystroke sequence against the binding table

use std::rc::Rc;

use super::binding::KeyBinding;
use super::scope::ScopeChain;
use super::selector::{Selector, Specificity};

/// How a binding's key sequence relates to the pressed keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMatch {
    None,
    /// Pressed keystrokes are a strict prefix of the binding
    Partial,
    Exact,
}

/// Compare a binding's keys with the pressed keystrokes
pub fn match_sequence(binding_keys: &[String], pressed: &[String]) -> SequenceMatch {
    if pressed.is_empty() || binding_keys.len() < pressed.len() {
        return SequenceMatch::None;
    }
    if binding_keys[..pressed.len()] != *pressed {
        return SequenceMatch::None;
    }
    if binding_keys.len() == pressed.len() {
        SequenceMatch::Exact
    } else {
        SequenceMatch::Partial
    }
}

/// Innermost scope level at which `selector` matches, if any
pub fn target_distance(selector: &Selector, target: &dyn ScopeChain) -> Option<usize> {
    (0..target.depth()).find(|&level| target.matches(level, selector))
}

/// Outcome of matching the pressed sequence
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    NoMatch,
    /// Every binding that could still complete, in registration order
    Partial(Vec<Rc<KeyBinding>>),
    Exact(Rc<KeyBinding>),
}

impl MatchResult {
    /// Whether the event that produced this match should have its default
    /// action suppressed
    pub fn prevents_default(&self) -> bool {
        match self {
            MatchResult::NoMatch => false,
            MatchResult::Partial(candidates) => candidates.iter().any(|b| b.prevent_default),
            MatchResult::Exact(binding) => binding.prevent_default,
        }
    }
}

/// Find the binding for the pressed keystrokes at the event target
///
/// Only candidates at the innermost matching scope are considered. Among
/// exact matches there, higher selector specificity wins, then the
/// later-registered binding. Exact beats partial at the same scope.
pub fn match_key_binding(
    bindings: &[Rc<KeyBinding>],
    pressed: &[String],
    target: &dyn ScopeChain,
) -> MatchResult {
    let mut distance = usize::MAX;
    let mut exact: Option<(&Rc<KeyBinding>, Specificity)> = None;
    let mut partials: Vec<Rc<KeyBinding>> = Vec::new();

    for binding in bindings {
        let sequence = match_sequence(&binding.keys, pressed);
        if sequence == SequenceMatch::None {
            continue;
        }

        let Some(td) = target_distance(&binding.selector, target) else {
            continue;
        };
        if td > distance {
            continue;
        }
        if td < distance {
            // A closer scope discards everything found further out
            distance = td;
            exact = None;
            partials.clear();
        }

        match sequence {
            SequenceMatch::Exact => {
                let specificity = binding.selector.specificity();
                let replace = exact.map_or(true, |(_, current)| specificity >= current);
                if replace {
                    exact = Some((binding, specificity));
                }
            }
            SequenceMatch::Partial => partials.push(binding.clone()),
            SequenceMatch::None => {}
        }
    }

    match exact {
        Some((binding, _)) => MatchResult::Exact(binding.clone()),
        None if !partials.is_empty() => MatchResult::Partial(partials),
        None => MatchResult::NoMatch,
    }
}
