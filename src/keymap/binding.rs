//! Key bindings: a chord sequence scoped by a selector, mapped to a command

use serde::Deserialize;
use serde_json::Value;

use super::error::KeymapError;
use super::keystroke::{format_keystrokes_for, normalize_keystroke_for, Platform};
use super::selector::Selector;

/// Registration order of a binding; later bindings have larger ids
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) u64);

/// What a caller asks to register
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyBindingOptions {
    /// Chord sequence, e.g. `["Accel K", "Accel L"]`
    pub keys: Vec<String>,
    pub selector: String,
    pub command: String,
    #[serde(default)]
    pub args: Option<Value>,
    #[serde(default)]
    pub mac_keys: Option<Vec<String>>,
    #[serde(default)]
    pub win_keys: Option<Vec<String>>,
    #[serde(default)]
    pub linux_keys: Option<Vec<String>>,
    #[serde(default)]
    pub prevent_default: Option<bool>,
}

impl KeyBindingOptions {
    /// Create options for a single-chord binding
    pub fn new(keystroke: &str, selector: &str, command: &str) -> Self {
        Self::chord(&[keystroke], selector, command)
    }

    /// Create options for a multi-chord binding
    pub fn chord<S: AsRef<str>>(keys: &[S], selector: &str, command: &str) -> Self {
        Self {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            selector: selector.to_string(),
            command: command.to_string(),
            args: None,
            mac_keys: None,
            win_keys: None,
            linux_keys: None,
            prevent_default: None,
        }
    }

    pub fn args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn prevent_default(mut self, prevent: bool) -> Self {
        self.prevent_default = Some(prevent);
        self
    }

    pub fn platform_keys<S: AsRef<str>>(mut self, platform: Platform, keys: &[S]) -> Self {
        let keys = Some(keys.iter().map(|k| k.as_ref().to_string()).collect());
        match platform {
            Platform::Mac => self.mac_keys = keys,
            Platform::Windows => self.win_keys = keys,
            Platform::Linux => self.linux_keys = keys,
        }
        self
    }

    /// The key list that applies on `platform`
    pub fn keys_for(&self, platform: Platform) -> &[String] {
        let specific = match platform {
            Platform::Mac => self.mac_keys.as_ref(),
            Platform::Windows => self.win_keys.as_ref(),
            Platform::Linux => self.linux_keys.as_ref(),
        };
        specific.unwrap_or(&self.keys)
    }
}

/// A registered, normalized key binding
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub id: BindingId,
    /// Canonical keystrokes
    pub keys: Vec<String>,
    pub selector: Selector,
    pub command: String,
    pub args: Value,
    pub prevent_default: bool,
}

impl KeyBinding {
    /// Validate and normalize options into a binding
    ///
    /// Nothing is partially built: any invalid keystroke or selector fails the
    /// whole binding.
    pub(crate) fn from_options(
        id: BindingId,
        options: &KeyBindingOptions,
        platform: Platform,
    ) -> Result<Self, KeymapError> {
        let selector = Selector::parse(&options.selector)?;

        let keys = options.keys_for(platform);
        if keys.is_empty() {
            return Err(KeymapError::EmptySequence(options.command.clone()));
        }
        let keys = keys
            .iter()
            .map(|k| normalize_keystroke_for(k, platform))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            keys,
            selector,
            command: options.command.clone(),
            args: options.args.clone().unwrap_or_else(|| Value::Object(Default::default())),
            prevent_default: options.prevent_default.unwrap_or(true),
        })
    }

    /// Check if this is a chord (multi-keystroke) binding
    pub fn is_chord(&self) -> bool {
        self.keys.len() > 1
    }

    /// Get display string for this keybinding
    pub fn display_string(&self, platform: Platform) -> String {
        format_keystrokes_for(&self.keys, platform)
    }
}
