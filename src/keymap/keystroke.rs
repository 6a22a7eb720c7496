//! Keystroke strings: parsing, canonical normalization and display formatting
//!
//! A canonical keystroke is zero or more modifier tokens in the fixed order
//! `Ctrl Cmd Alt Shift` followed by exactly one key token, separated by single
//! spaces, e.g. `"Ctrl Shift S"` or `"ArrowLeft"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::KeymapError;

/// Host platform, which decides how `Accel` and `Cmd` resolve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(alias = "macos")]
    Mac,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    #[inline]
    pub const fn is_mac(self) -> bool {
        matches!(self, Platform::Mac)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Mac => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

/// The pieces of a parsed keystroke
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeystrokeParts {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub cmd: bool,
    /// Primary key, empty if the keystroke named only modifiers
    pub key: String,
}

impl KeystrokeParts {
    /// Serialize in canonical order for `platform`
    ///
    /// Returns `None` if there is no primary key.
    pub fn to_canonical(&self, platform: Platform) -> Option<String> {
        if self.key.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(self.key.len() + 16);
        if self.ctrl {
            out.push_str("Ctrl ");
        }
        if self.cmd && platform.is_mac() {
            out.push_str("Cmd ");
        }
        if self.alt {
            out.push_str("Alt ");
        }
        if self.shift {
            out.push_str("Shift ");
        }
        out.push_str(&self.key);
        Some(out)
    }
}

/// Parse a keystroke like `"Accel Shift K"` for the current platform
pub fn parse_keystroke(keystroke: &str) -> KeystrokeParts {
    parse_keystroke_for(keystroke, Platform::current())
}

/// Parse a keystroke for an explicit platform
///
/// Never fails: unknown tokens are taken as the primary key and a later key
/// token replaces an earlier one.
pub fn parse_keystroke_for(keystroke: &str, platform: Platform) -> KeystrokeParts {
    let mut parts = KeystrokeParts::default();
    for token in keystroke.split_whitespace() {
        if token.eq_ignore_ascii_case("accel") {
            if platform.is_mac() {
                parts.cmd = true;
            } else {
                parts.ctrl = true;
            }
        } else if token.eq_ignore_ascii_case("cmd") {
            parts.cmd = true;
        } else if token.eq_ignore_ascii_case("ctrl") {
            parts.ctrl = true;
        } else if token.eq_ignore_ascii_case("alt") {
            parts.alt = true;
        } else if token.eq_ignore_ascii_case("shift") {
            parts.shift = true;
        } else {
            parts.key = token.to_string();
        }
    }
    parts
}

/// Normalize a keystroke into canonical form for the current platform
pub fn normalize_keystroke(keystroke: &str) -> Result<String, KeymapError> {
    normalize_keystroke_for(keystroke, Platform::current())
}

pub fn normalize_keystroke_for(keystroke: &str, platform: Platform) -> Result<String, KeymapError> {
    parse_keystroke_for(keystroke, platform)
        .to_canonical(platform)
        .ok_or_else(|| KeymapError::NoKey(keystroke.to_string()))
}

/// Format a single keystroke for display on the current platform
pub fn format_keystroke(keystroke: &str) -> String {
    format_keystroke_for(keystroke, Platform::current())
}

/// Format a chord sequence for display, chords joined with `", "`
pub fn format_keystrokes<S: AsRef<str>>(keystrokes: &[S]) -> String {
    format_keystrokes_for(keystrokes, Platform::current())
}

pub fn format_keystrokes_for<S: AsRef<str>>(keystrokes: &[S], platform: Platform) -> String {
    keystrokes
        .iter()
        .map(|k| format_keystroke_for(k.as_ref(), platform))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_keystroke_for(keystroke: &str, platform: Platform) -> String {
    let parts = parse_keystroke_for(keystroke, platform);
    let mut tokens: Vec<&str> = Vec::with_capacity(5);
    if parts.ctrl {
        tokens.push("Ctrl");
    }
    if parts.alt {
        tokens.push("Alt");
    }
    if parts.shift {
        tokens.push("Shift");
    }
    if parts.cmd && platform.is_mac() {
        tokens.push("Cmd");
    }
    if !parts.key.is_empty() {
        tokens.push(&parts.key);
    }

    let separator = if platform.is_mac() { " " } else { "+" };
    tokens
        .into_iter()
        .map(|t| display_token(t, platform))
        .collect::<Vec<_>>()
        .join(separator)
}

fn display_token(token: &str, platform: Platform) -> &str {
    // Arrows render as glyphs everywhere
    match token {
        "ArrowLeft" => return "←",
        "ArrowUp" => return "↑",
        "ArrowRight" => return "→",
        "ArrowDown" => return "↓",
        _ => {}
    }

    if platform.is_mac() {
        match token {
            "Backspace" => "⌫",
            "Tab" => "⇥",
            "Enter" => "↩",
            "Shift" => "⇧",
            "Ctrl" => "⌃",
            "Alt" => "⌥",
            "Escape" => "⎋",
            "PageUp" => "⇞",
            "PageDown" => "⇟",
            "End" => "↘",
            "Home" => "↖",
            "Delete" => "⌦",
            "Cmd" => "⌘",
            other => other,
        }
    } else {
        match token {
            "Escape" => "Esc",
            "PageUp" => "Page Up",
            "PageDown" => "Page Down",
            "Delete" => "Del",
            other => other,
        }
    }
}
