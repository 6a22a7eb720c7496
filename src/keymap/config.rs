//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into [`KeyBindingOptions`].
//!
//! ```yaml
//! bindings:
//!   - key: "Accel S"
//!     command: file:save
//!   - keys: ["Accel K", "Accel L"]
//!     selector: ".editor"
//!     command: editor:fold
//!     args: { all: true }
//!     mac_keys: ["Cmd K", "Cmd L"]
//!   - key: "Ctrl Q"
//!     command: app:quit
//!     platform: linux
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::binding::KeyBindingOptions;
use super::error::KeymapError;
use super::keystroke::Platform;

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    /// Single-chord shorthand for `keys`
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default = "default_selector")]
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
    /// Only load this entry on the given platform
    #[serde(default)]
    pub platform: Option<Platform>,
}

fn default_selector() -> String {
    "*".to_string()
}

impl BindingConfig {
    fn into_options(self) -> Result<KeyBindingOptions, KeymapError> {
        let keys = match (self.key, self.keys) {
            (Some(_), Some(_)) => {
                return Err(KeymapError::Parse(format!(
                    "binding for '{}' sets both 'key' and 'keys'",
                    self.command
                )))
            }
            (Some(key), None) => vec![key],
            (None, Some(keys)) => keys,
            (None, None) => Vec::new(),
        };

        Ok(KeyBindingOptions {
            keys,
            selector: self.selector,
            command: self.command,
            args: self.args,
            mac_keys: self.mac_keys,
            win_keys: self.win_keys,
            linux_keys: self.linux_keys,
            prevent_default: self.prevent_default,
        })
    }
}

/// Load key bindings from a YAML file for the current platform
pub fn load_keymap_file(path: &Path) -> Result<Vec<KeyBindingOptions>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::Io(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse key bindings from a YAML string for the current platform
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<KeyBindingOptions>, KeymapError> {
    parse_keymap_yaml_for(yaml, Platform::current())
}

/// Parse key bindings, dropping entries restricted to other platforms
///
/// Keystrokes are not normalized here; registration does that.
pub fn parse_keymap_yaml_for(
    yaml: &str,
    platform: Platform,
) -> Result<Vec<KeyBindingOptions>, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::Parse(e.to_string()))?;

    let mut bindings = Vec::with_capacity(config.bindings.len());
    for entry in config.bindings {
        if entry.platform.is_some_and(|p| p != platform) {
            continue;
        }
        bindings.push(entry.into_options()?);
    }

    Ok(bindings)
}
