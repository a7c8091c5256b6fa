//! Platform key tables and the winit host adapter.
//!
//! Contains:
//! - Named key alias table (string -> [`KeyCode`]) and its display inverse
//! - winit physical key / modifier-state conversion
//! - [`WinitKeyHook`], a [`KeyHook`] fed from a winit event loop

use crate::interceptor::{HookError, KeyHook};
use crate::parser::{KeyCode, Modifiers};
use winit::keyboard::{KeyCode as WinitKeyCode, ModifiersState};

/// Resolve a named key (case-insensitive), including `F1`-`F12`.
pub fn named_key_code(s: &str) -> Option<KeyCode> {
    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f')
        && let Ok(n) = n.parse::<u8>()
    {
        return KeyCode::function(n);
    }

    match lower.as_str() {
        "tab" => Some(KeyCode::TAB),
        "enter" | "return" => Some(KeyCode::ENTER),
        "escape" | "esc" => Some(KeyCode::ESCAPE),
        "space" => Some(KeyCode::SPACE),
        "backspace" => Some(KeyCode::BACKSPACE),
        "delete" | "del" => Some(KeyCode::DELETE),
        "insert" | "ins" => Some(KeyCode::INSERT),
        "home" => Some(KeyCode::HOME),
        "end" => Some(KeyCode::END),
        "pageup" | "pgup" => Some(KeyCode::PAGE_UP),
        "pagedown" | "pgdn" => Some(KeyCode::PAGE_DOWN),
        "left" | "arrowleft" => Some(KeyCode::LEFT),
        "right" | "arrowright" => Some(KeyCode::RIGHT),
        "up" | "arrowup" => Some(KeyCode::UP),
        "down" | "arrowdown" => Some(KeyCode::DOWN),
        _ => None,
    }
}

/// Canonical display name for non-character, non-function keys.
pub fn key_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::TAB => Some("Tab"),
        KeyCode::ENTER => Some("Enter"),
        KeyCode::ESCAPE => Some("Escape"),
        KeyCode::SPACE => Some("Space"),
        KeyCode::BACKSPACE => Some("Backspace"),
        KeyCode::DELETE => Some("Delete"),
        KeyCode::INSERT => Some("Insert"),
        KeyCode::HOME => Some("Home"),
        KeyCode::END => Some("End"),
        KeyCode::PAGE_UP => Some("PageUp"),
        KeyCode::PAGE_DOWN => Some("PageDown"),
        KeyCode::LEFT => Some("Left"),
        KeyCode::RIGHT => Some("Right"),
        KeyCode::UP => Some("Up"),
        KeyCode::DOWN => Some("Down"),
        _ => None,
    }
}

/// Convert a winit physical key into the byte-sized key code space.
///
/// Returns `None` for keys that can never be part of an intercepted chord
/// (modifier keys themselves, media keys, etc.).
pub fn key_code_from_winit(code: WinitKeyCode) -> Option<KeyCode> {
    let key = match code {
        WinitKeyCode::F1 => KeyCode::F1,
        WinitKeyCode::F2 => KeyCode(0x71),
        WinitKeyCode::F3 => KeyCode(0x72),
        WinitKeyCode::F4 => KeyCode::F4,
        WinitKeyCode::F5 => KeyCode::F5,
        WinitKeyCode::F6 => KeyCode(0x75),
        WinitKeyCode::F7 => KeyCode::F7,
        WinitKeyCode::F8 => KeyCode(0x77),
        WinitKeyCode::F9 => KeyCode(0x78),
        WinitKeyCode::F10 => KeyCode(0x79),
        WinitKeyCode::F11 => KeyCode(0x7A),
        WinitKeyCode::F12 => KeyCode::F12,
        WinitKeyCode::Tab => KeyCode::TAB,
        WinitKeyCode::Enter | WinitKeyCode::NumpadEnter => KeyCode::ENTER,
        WinitKeyCode::Escape => KeyCode::ESCAPE,
        WinitKeyCode::Space => KeyCode::SPACE,
        WinitKeyCode::Backspace => KeyCode::BACKSPACE,
        WinitKeyCode::Delete => KeyCode::DELETE,
        WinitKeyCode::Insert => KeyCode::INSERT,
        WinitKeyCode::Home => KeyCode::HOME,
        WinitKeyCode::End => KeyCode::END,
        WinitKeyCode::PageUp => KeyCode::PAGE_UP,
        WinitKeyCode::PageDown => KeyCode::PAGE_DOWN,
        WinitKeyCode::ArrowLeft => KeyCode::LEFT,
        WinitKeyCode::ArrowRight => KeyCode::RIGHT,
        WinitKeyCode::ArrowUp => KeyCode::UP,
        WinitKeyCode::ArrowDown => KeyCode::DOWN,
        WinitKeyCode::Digit0 => KeyCode(b'0'),
        WinitKeyCode::Digit1 => KeyCode(b'1'),
        WinitKeyCode::Digit2 => KeyCode(b'2'),
        WinitKeyCode::Digit3 => KeyCode(b'3'),
        WinitKeyCode::Digit4 => KeyCode(b'4'),
        WinitKeyCode::Digit5 => KeyCode(b'5'),
        WinitKeyCode::Digit6 => KeyCode(b'6'),
        WinitKeyCode::Digit7 => KeyCode(b'7'),
        WinitKeyCode::Digit8 => KeyCode(b'8'),
        WinitKeyCode::Digit9 => KeyCode(b'9'),
        WinitKeyCode::KeyA => KeyCode(b'A'),
        WinitKeyCode::KeyB => KeyCode(b'B'),
        WinitKeyCode::KeyC => KeyCode(b'C'),
        WinitKeyCode::KeyD => KeyCode(b'D'),
        WinitKeyCode::KeyE => KeyCode(b'E'),
        WinitKeyCode::KeyF => KeyCode(b'F'),
        WinitKeyCode::KeyG => KeyCode(b'G'),
        WinitKeyCode::KeyH => KeyCode(b'H'),
        WinitKeyCode::KeyI => KeyCode(b'I'),
        WinitKeyCode::KeyJ => KeyCode(b'J'),
        WinitKeyCode::KeyK => KeyCode(b'K'),
        WinitKeyCode::KeyL => KeyCode(b'L'),
        WinitKeyCode::KeyM => KeyCode(b'M'),
        WinitKeyCode::KeyN => KeyCode(b'N'),
        WinitKeyCode::KeyO => KeyCode(b'O'),
        WinitKeyCode::KeyP => KeyCode(b'P'),
        WinitKeyCode::KeyQ => KeyCode(b'Q'),
        WinitKeyCode::KeyR => KeyCode(b'R'),
        WinitKeyCode::KeyS => KeyCode(b'S'),
        WinitKeyCode::KeyT => KeyCode(b'T'),
        WinitKeyCode::KeyU => KeyCode(b'U'),
        WinitKeyCode::KeyV => KeyCode(b'V'),
        WinitKeyCode::KeyW => KeyCode(b'W'),
        WinitKeyCode::KeyX => KeyCode(b'X'),
        WinitKeyCode::KeyY => KeyCode(b'Y'),
        WinitKeyCode::KeyZ => KeyCode(b'Z'),
        _ => return None,
    };
    Some(key)
}

/// Project winit's modifier state onto the three interceptable modifiers.
pub fn modifiers_from_winit(state: ModifiersState) -> Modifiers {
    Modifiers {
        ctrl: state.control_key(),
        alt: state.alt_key(),
        shift: state.shift_key(),
    }
}

/// Key hook for hosts that drive input through a winit event loop.
///
/// winit delivers keyboard input to the window that owns the loop, so
/// "installing" only arms the hook; the host forwards
/// `WindowEvent::ModifiersChanged` through [`WinitKeyHook::update_modifiers`]
/// to keep the live modifier state current.
#[derive(Debug, Default)]
pub struct WinitKeyHook {
    modifiers: Modifiers,
    armed: bool,
}

impl WinitKeyHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = modifiers_from_winit(state);
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl KeyHook for WinitKeyHook {
    fn install(&mut self) -> Result<(), HookError> {
        self.armed = true;
        Ok(())
    }

    fn uninstall(&mut self) {
        self.armed = false;
        self.modifiers = Modifiers::NONE;
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}
