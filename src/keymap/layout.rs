//! Keyboard layouts: resolving virtual key codes to key names

use std::collections::HashMap;
use std::rc::Rc;

use super::event::KeydownEvent;
use super::keystroke::{parse_keystroke_for, KeystrokeParts, Platform};
use super::scope::ScopeChain;

/// Resolves keydown events to key names
pub trait KeyboardLayout {
    fn name(&self) -> &str;

    /// Every key name this layout can produce
    fn keys(&self) -> Vec<String>;

    fn is_valid_key(&self, key: &str) -> bool;

    /// Whether `key` is a modifier key (`Shift`, `Ctrl`, `Alt`, `Meta`, ...)
    fn is_modifier_key(&self, key: &str) -> bool;

    /// Key name for the event's key code, `None` if the layout does not know it
    fn key_for_keydown_event(&self, event: &KeydownEvent) -> Option<String>;
}

/// A layout backed by a virtual-key-code table
#[derive(Debug, Clone)]
pub struct KeycodeLayout {
    name: String,
    codes: HashMap<u32, &'static str>,
    modifier_keys: Vec<&'static str>,
}

impl KeycodeLayout {
    pub fn new(
        name: impl Into<String>,
        codes: HashMap<u32, &'static str>,
        modifier_keys: Vec<&'static str>,
    ) -> Self {
        Self {
            name: name.into(),
            codes,
            modifier_keys,
        }
    }

    /// US English layout keyed by virtual key code
    pub fn en_us() -> Self {
        let mut codes: HashMap<u32, &'static str> = HashMap::from([
            (8, "Backspace"),
            (9, "Tab"),
            (13, "Enter"),
            (16, "Shift"),
            (17, "Ctrl"),
            (18, "Alt"),
            (19, "Pause"),
            (27, "Escape"),
            (32, "Space"),
            (33, "PageUp"),
            (34, "PageDown"),
            (35, "End"),
            (36, "Home"),
            (37, "ArrowLeft"),
            (38, "ArrowUp"),
            (39, "ArrowRight"),
            (40, "ArrowDown"),
            (45, "Insert"),
            (46, "Delete"),
            (59, ";"),
            (61, "="),
            (91, "Meta"),
            (93, "ContextMenu"),
            (106, "*"),
            (107, "+"),
            (109, "-"),
            (110, "."),
            (111, "/"),
            (173, "-"),
            (186, ";"),
            (187, "="),
            (188, ","),
            (189, "-"),
            (190, "."),
            (191, "/"),
            (192, "`"),
            (219, "["),
            (220, "\\"),
            (221, "]"),
            (222, "'"),
            (224, "Meta"),
            (225, "AltGraph"),
        ]);

        const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        const LETTERS: [&str; 26] = [
            "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
            "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
        ];
        const FUNCTION_KEYS: [&str; 12] = [
            "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
        ];

        for (i, &digit) in DIGITS.iter().enumerate() {
            codes.insert(48 + i as u32, digit);
            // Numpad digits resolve to the same key names
            codes.insert(96 + i as u32, digit);
        }
        for (i, &letter) in LETTERS.iter().enumerate() {
            codes.insert(65 + i as u32, letter);
        }
        for (i, &fkey) in FUNCTION_KEYS.iter().enumerate() {
            codes.insert(112 + i as u32, fkey);
        }

        Self::new(
            "en-us",
            codes,
            vec!["Shift", "Ctrl", "Alt", "Meta", "AltGraph"],
        )
    }

    /// First virtual key code that resolves to `key`
    ///
    /// Prefers the lowest code, so digits map to the main row, not the numpad.
    pub fn code_for_key(&self, key: &str) -> Option<u32> {
        self.codes
            .iter()
            .filter(|(_, k)| **k == key)
            .map(|(code, _)| *code)
            .min()
    }

    /// Build a keydown event that this layout resolves back to `keystroke`
    ///
    /// Returns `None` if the keystroke's key has no code in this layout.
    pub fn keydown_event(
        &self,
        keystroke: &str,
        target: Rc<dyn ScopeChain>,
        platform: Platform,
    ) -> Option<KeydownEvent> {
        let parts = parse_keystroke_for(keystroke, platform);
        let code = self.code_for_key(&parts.key)?;
        Some(KeydownEvent::new(code, target).with_modifiers(
            parts.ctrl,
            parts.alt,
            parts.shift,
            parts.cmd,
        ))
    }
}

impl Default for KeycodeLayout {
    fn default() -> Self {
        Self::en_us()
    }
}

impl KeyboardLayout for KeycodeLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.codes.values().map(|k| k.to_string()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn is_valid_key(&self, key: &str) -> bool {
        self.codes.values().any(|k| *k == key)
    }

    fn is_modifier_key(&self, key: &str) -> bool {
        self.modifier_keys.contains(&key)
    }

    fn key_for_keydown_event(&self, event: &KeydownEvent) -> Option<String> {
        self.codes.get(&event.key_code).map(|k| k.to_string())
    }
}

/// Canonical keystroke for a keydown event on the current platform
pub fn keystroke_for_keydown_event(event: &KeydownEvent, layout: &dyn KeyboardLayout) -> String {
    keystroke_for_keydown_event_for(event, layout, Platform::current())
}

/// Canonical keystroke for a keydown event
///
/// Returns an empty string if the layout cannot resolve the key code. A bare
/// modifier press yields just that modifier's token.
pub fn keystroke_for_keydown_event_for(
    event: &KeydownEvent,
    layout: &dyn KeyboardLayout,
    platform: Platform,
) -> String {
    let Some(key) = layout.key_for_keydown_event(event) else {
        return String::new();
    };
    if layout.is_modifier_key(&key) {
        return modifier_token(&key, platform).to_string();
    }

    let parts = KeystrokeParts {
        ctrl: event.ctrl,
        alt: event.alt,
        shift: event.shift,
        cmd: event.meta && platform.is_mac(),
        key,
    };
    parts.to_canonical(platform).unwrap_or_default()
}

fn modifier_token(key: &str, platform: Platform) -> &str {
    match key {
        "Control" | "Ctrl" => "Ctrl",
        "AltGraph" | "Alt" => "Alt",
        "Meta" if platform.is_mac() => "Cmd",
        other => other,
    }
}
