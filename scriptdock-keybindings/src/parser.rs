//! Chord types and parser.
//!
//! Parses human-readable key strings like "Ctrl+Shift+B" or "F5" into
//! [`Chord`] values. Matching is exact and structural: a chord equals another
//! only when the key code and all three modifier flags agree.

use std::fmt;
use thiserror::Error;

/// Error type for key parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(String);

/// Byte-sized key identifier (virtual-key numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(0x08);
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);
    pub const PAGE_UP: KeyCode = KeyCode(0x21);
    pub const PAGE_DOWN: KeyCode = KeyCode(0x22);
    pub const END: KeyCode = KeyCode(0x23);
    pub const HOME: KeyCode = KeyCode(0x24);
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const DOWN: KeyCode = KeyCode(0x28);
    pub const INSERT: KeyCode = KeyCode(0x2D);
    pub const DELETE: KeyCode = KeyCode(0x2E);
    pub const F1: KeyCode = KeyCode(0x70);
    pub const F4: KeyCode = KeyCode(0x73);
    pub const F5: KeyCode = KeyCode(0x74);
    pub const F7: KeyCode = KeyCode(0x76);
    pub const F12: KeyCode = KeyCode(0x7B);

    /// Function key `F<n>` for `n` in 1..=12.
    pub fn function(n: u8) -> Option<KeyCode> {
        (1..=12).contains(&n).then(|| KeyCode(Self::F1.0 + n - 1))
    }

    /// Letter or digit key producing `ch` (case-insensitive).
    pub fn from_char(ch: char) -> Option<KeyCode> {
        let upper = ch.to_ascii_uppercase();
        if upper.is_ascii_uppercase() || upper.is_ascii_digit() {
            Some(KeyCode(upper as u8))
        } else {
            None
        }
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = crate::platform::key_name(*self) {
            return f.write_str(name);
        }
        if (Self::F1.0..=Self::F12.0).contains(&self.0) {
            return write!(f, "F{}", self.0 - Self::F1.0 + 1);
        }
        let ch = self.0 as char;
        if ch.is_ascii_uppercase() || ch.is_ascii_digit() {
            write!(f, "{}", ch)
        } else {
            write!(f, "0x{:02X}", self.0)
        }
    }
}

/// Set of active modifiers for a chord.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
    };

    pub fn new(ctrl: bool, alt: bool, shift: bool) -> Self {
        Self { ctrl, alt, shift }
    }
}

/// A key code plus modifier flags, the unit of shortcut matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: Modifiers,
    pub key: KeyCode,
}

impl Chord {
    pub fn new(modifiers: Modifiers, key: KeyCode) -> Self {
        Self { modifiers, key }
    }

    /// Chord with no modifiers.
    pub fn key(key: KeyCode) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self::new(Modifiers::CTRL, key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.modifiers.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.alt {
            parts.push("Alt".to_string());
        }
        if self.modifiers.shift {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.to_string());

        write!(f, "{}", parts.join("+"))
    }
}

impl std::str::FromStr for Chord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}

/// Parse a chord string into a [`Chord`].
///
/// Supported format: "Modifier+Modifier+Key"
///
/// Modifiers:
/// - `Ctrl`, `Control` - Control key
/// - `Alt`, `Option` - Alt key
/// - `Shift` - Shift key
///
/// Keys:
/// - Single characters: `A`, `B`, `1`, etc.
/// - Named keys: `F1`-`F12`, `Enter`, `Escape`, `Space`, `Tab`, etc.
pub fn parse_chord(s: &str) -> Result<Chord, ParseError> {
    if s.trim().is_empty() {
        return Err(ParseError("Empty key combination".to_string()));
    }

    let parts: Vec<&str> = s.split('+').map(str::trim).collect();

    let mut modifiers = Modifiers::default();
    let mut key_part = None;

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;

        let is_modifier = match part.to_lowercase().as_str() {
            "ctrl" | "control" => {
                modifiers.ctrl = true;
                true
            }
            "alt" | "option" => {
                modifiers.alt = true;
                true
            }
            "shift" => {
                modifiers.shift = true;
                true
            }
            "super" | "cmd" | "command" | "meta" | "win" | "cmdorctrl" => {
                return Err(ParseError(format!(
                    "Unsupported modifier '{}': only Ctrl, Alt and Shift can be intercepted",
                    part
                )));
            }
            _ => false,
        };

        if !is_modifier {
            if key_part.is_some() {
                return Err(ParseError(format!(
                    "Multiple keys specified: already have key, found '{}'",
                    part
                )));
            }
            key_part = Some(*part);
        } else if is_last {
            return Err(ParseError(
                "Key combination ends with modifier, no key specified".to_string(),
            ));
        }
    }

    let key_str = key_part.ok_or_else(|| ParseError("No key specified".to_string()))?;
    let key = parse_key(key_str)?;

    Ok(Chord { modifiers, key })
}

/// Parse a key string into a [`KeyCode`].
fn parse_key(s: &str) -> Result<KeyCode, ParseError> {
    if let Some(code) = crate::platform::named_key_code(s) {
        return Ok(code);
    }

    let mut chars = s.chars();
    if let (Some(ch), None) = (chars.next(), chars.next())
        && let Some(code) = KeyCode::from_char(ch)
    {
        return Ok(code);
    }

    Err(ParseError(format!("Unknown key: '{}'", s)))
}
