//! Adapter to convert winit key events to [`KeydownEvent`]s
//!
//! Physical keys are mapped to the virtual key codes used by
//! [`KeycodeLayout::en_us`](super::KeycodeLayout::en_us).

use std::rc::Rc;

use winit::keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey};

use super::event::KeydownEvent;
use super::scope::ScopeChain;

/// Virtual key code for a winit physical key
///
/// Returns None if the key cannot be mapped (e.g., unknown keys)
pub fn virtual_key_code(physical_key: PhysicalKey) -> Option<u32> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };

    let vk = match code {
        // Letters
        WinitKeyCode::KeyA => 65,
        WinitKeyCode::KeyB => 66,
        WinitKeyCode::KeyC => 67,
        WinitKeyCode::KeyD => 68,
        WinitKeyCode::KeyE => 69,
        WinitKeyCode::KeyF => 70,
        WinitKeyCode::KeyG => 71,
        WinitKeyCode::KeyH => 72,
        WinitKeyCode::KeyI => 73,
        WinitKeyCode::KeyJ => 74,
        WinitKeyCode::KeyK => 75,
        WinitKeyCode::KeyL => 76,
        WinitKeyCode::KeyM => 77,
        WinitKeyCode::KeyN => 78,
        WinitKeyCode::KeyO => 79,
        WinitKeyCode::KeyP => 80,
        WinitKeyCode::KeyQ => 81,
        WinitKeyCode::KeyR => 82,
        WinitKeyCode::KeyS => 83,
        WinitKeyCode::KeyT => 84,
        WinitKeyCode::KeyU => 85,
        WinitKeyCode::KeyV => 86,
        WinitKeyCode::KeyW => 87,
        WinitKeyCode::KeyX => 88,
        WinitKeyCode::KeyY => 89,
        WinitKeyCode::KeyZ => 90,

        // Digits
        WinitKeyCode::Digit0 => 48,
        WinitKeyCode::Digit1 => 49,
        WinitKeyCode::Digit2 => 50,
        WinitKeyCode::Digit3 => 51,
        WinitKeyCode::Digit4 => 52,
        WinitKeyCode::Digit5 => 53,
        WinitKeyCode::Digit6 => 54,
        WinitKeyCode::Digit7 => 55,
        WinitKeyCode::Digit8 => 56,
        WinitKeyCode::Digit9 => 57,

        // Numpad
        WinitKeyCode::Numpad0 => 96,
        WinitKeyCode::Numpad1 => 97,
        WinitKeyCode::Numpad2 => 98,
        WinitKeyCode::Numpad3 => 99,
        WinitKeyCode::Numpad4 => 100,
        WinitKeyCode::Numpad5 => 101,
        WinitKeyCode::Numpad6 => 102,
        WinitKeyCode::Numpad7 => 103,
        WinitKeyCode::Numpad8 => 104,
        WinitKeyCode::Numpad9 => 105,
        WinitKeyCode::NumpadMultiply => 106,
        WinitKeyCode::NumpadAdd => 107,
        WinitKeyCode::NumpadSubtract => 109,
        WinitKeyCode::NumpadDecimal => 110,
        WinitKeyCode::NumpadDivide => 111,
        WinitKeyCode::NumpadEnter => 13,

        // Editing
        WinitKeyCode::Backspace => 8,
        WinitKeyCode::Tab => 9,
        WinitKeyCode::Enter => 13,
        WinitKeyCode::Escape => 27,
        WinitKeyCode::Space => 32,
        WinitKeyCode::Insert => 45,
        WinitKeyCode::Delete => 46,
        WinitKeyCode::Pause => 19,
        WinitKeyCode::ContextMenu => 93,

        // Navigation
        WinitKeyCode::PageUp => 33,
        WinitKeyCode::PageDown => 34,
        WinitKeyCode::End => 35,
        WinitKeyCode::Home => 36,
        WinitKeyCode::ArrowLeft => 37,
        WinitKeyCode::ArrowUp => 38,
        WinitKeyCode::ArrowRight => 39,
        WinitKeyCode::ArrowDown => 40,

        // Modifiers
        WinitKeyCode::ShiftLeft | WinitKeyCode::ShiftRight => 16,
        WinitKeyCode::ControlLeft | WinitKeyCode::ControlRight => 17,
        WinitKeyCode::AltLeft => 18,
        WinitKeyCode::AltRight => 225,
        WinitKeyCode::SuperLeft | WinitKeyCode::SuperRight => 91,

        // Punctuation
        WinitKeyCode::Semicolon => 186,
        WinitKeyCode::Equal => 187,
        WinitKeyCode::Comma => 188,
        WinitKeyCode::Minus => 189,
        WinitKeyCode::Period => 190,
        WinitKeyCode::Slash => 191,
        WinitKeyCode::Backquote => 192,
        WinitKeyCode::BracketLeft => 219,
        WinitKeyCode::Backslash => 220,
        WinitKeyCode::BracketRight => 221,
        WinitKeyCode::Quote => 222,

        // Function keys
        WinitKeyCode::F1 => 112,
        WinitKeyCode::F2 => 113,
        WinitKeyCode::F3 => 114,
        WinitKeyCode::F4 => 115,
        WinitKeyCode::F5 => 116,
        WinitKeyCode::F6 => 117,
        WinitKeyCode::F7 => 118,
        WinitKeyCode::F8 => 119,
        WinitKeyCode::F9 => 120,
        WinitKeyCode::F10 => 121,
        WinitKeyCode::F11 => 122,
        WinitKeyCode::F12 => 123,

        _ => return None,
    };
    Some(vk)
}

/// Build a keydown event from winit key data, targeted at `target`
///
/// `super_key` (logo) becomes the event's meta flag, i.e. Cmd on macOS.
pub fn keydown_event_from_winit(
    physical_key: PhysicalKey,
    modifiers: ModifiersState,
    target: Rc<dyn ScopeChain>,
) -> Option<KeydownEvent> {
    let code = virtual_key_code(physical_key)?;
    Some(KeydownEvent::new(code, target).with_modifiers(
        modifiers.control_key(),
        modifiers.alt_key(),
        modifiers.shift_key(),
        modifiers.super_key(),
    ))
}
