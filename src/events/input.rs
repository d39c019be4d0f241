//! Key bindings parsed from configuration strings.

use crate::config::KeyBindings;
use crate::error::{Error, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

/// A single key with optional Ctrl/Alt modifiers, e.g. `Ctrl+r` or `Enter`.
///
/// Shift is ignored for character keys so that bindings such as `?` match
/// regardless of how the terminal reports the modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    ctrl: bool,
    alt: bool,
}

impl KeyBinding {
    /// Binding for a plain key.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
        }
    }

    /// Parse a binding string such as `"q"`, `"Ctrl+c"` or `"PageDown"`.
    pub fn parse(binding: &str) -> Result<Self> {
        let mut ctrl = false;
        let mut alt = false;

        // A trailing "+" is the plus key itself, as in "Ctrl++".
        let (mods, last) = match binding.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match binding.rsplit_once('+') {
                Some((mods, last)) => (mods, last),
                None => ("", binding),
            },
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "alt" => alt = true,
                "shift" => {}
                other => {
                    return Err(Error::config(format!(
                        "unknown modifier {other:?} in key binding {binding:?}"
                    )));
                }
            }
        }

        let lower = last.to_ascii_lowercase();
        let code = match lower.as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            s if s.len() > 1 && s.starts_with('f') => match s[1..].parse::<u8>() {
                Ok(n) => KeyCode::F(n),
                Err(_) => {
                    return Err(Error::config(format!("unknown key in binding {binding:?}")));
                }
            },
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        return Err(Error::config(format!(
                            "unknown key in binding {binding:?}"
                        )));
                    }
                }
            }
        };

        Ok(Self {
            code,
            ctrl,
            alt,
        })
    }

    /// Whether a key event triggers this binding.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.modifiers.contains(KeyModifiers::CONTROL) != self.ctrl
            || event.modifiers.contains(KeyModifiers::ALT) != self.alt
        {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(expected), KeyCode::Char(actual)) => {
                expected == actual.to_ascii_lowercase()
            }
            (expected, actual) => expected == actual,
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Esc => write!(f, "Esc"),
            KeyCode::PageUp => write!(f, "PgUp"),
            KeyCode::PageDown => write!(f, "PgDn"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Parsed key bindings of every command.
#[derive(Debug, Clone)]
pub struct Keymap {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub left: KeyBinding,
    pub right: KeyBinding,
    pub select: KeyBinding,
    pub back: KeyBinding,
    pub refresh: KeyBinding,
    pub trending: KeyBinding,
    pub search_view: KeyBinding,
    pub detail: KeyBinding,
    pub search: KeyBinding,
    pub theme: KeyBinding,
    pub auto_refresh: KeyBinding,
    pub dismiss: KeyBinding,
}

impl Keymap {
    /// Parse every binding; the first invalid one is reported.
    pub fn from_config(bindings: &KeyBindings) -> Result<Self> {
        Ok(Self {
            quit: KeyBinding::parse(&bindings.quit)?,
            help: KeyBinding::parse(&bindings.help)?,
            up: KeyBinding::parse(&bindings.up)?,
            down: KeyBinding::parse(&bindings.down)?,
            left: KeyBinding::parse(&bindings.left)?,
            right: KeyBinding::parse(&bindings.right)?,
            select: KeyBinding::parse(&bindings.select)?,
            back: KeyBinding::parse(&bindings.back)?,
            refresh: KeyBinding::parse(&bindings.refresh)?,
            trending: KeyBinding::parse(&bindings.trending)?,
            search_view: KeyBinding::parse(&bindings.search_view)?,
            detail: KeyBinding::parse(&bindings.detail)?,
            search: KeyBinding::parse(&bindings.search)?,
            theme: KeyBinding::parse(&bindings.theme)?,
            auto_refresh: KeyBinding::parse(&bindings.auto_refresh)?,
            dismiss: KeyBinding::parse(&bindings.dismiss)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_plain_and_modified_keys() {
        let q = KeyBinding::parse("q").unwrap();
        assert!(q.matches(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(q.matches(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(!q.matches(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)));

        let ctrl_r = KeyBinding::parse("Ctrl+r").unwrap();
        assert!(ctrl_r.matches(&key(KeyCode::Char('r'), KeyModifiers::CONTROL)));
        assert!(!ctrl_r.matches(&key(KeyCode::Char('r'), KeyModifiers::NONE)));
        assert_eq!(ctrl_r.to_string(), "Ctrl+r");
    }

    #[test]
    fn test_shifted_symbols_match() {
        let help = KeyBinding::parse("?").unwrap();
        assert!(help.matches(&key(KeyCode::Char('?'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(KeyBinding::parse("Enter").unwrap(), KeyBinding::new(KeyCode::Enter));
        assert_eq!(KeyBinding::parse("esc").unwrap(), KeyBinding::new(KeyCode::Esc));
        assert_eq!(KeyBinding::parse("F5").unwrap(), KeyBinding::new(KeyCode::F(5)));
        assert_eq!(
            KeyBinding::parse("Space").unwrap(),
            KeyBinding::new(KeyCode::Char(' '))
        );
        assert_eq!(
            KeyBinding::parse("Ctrl++").unwrap().to_string(),
            "Ctrl++"
        );
    }

    #[test]
    fn test_invalid_bindings_are_rejected() {
        assert!(KeyBinding::parse("Hyper+x").is_err());
        assert!(KeyBinding::parse("nope").is_err());
        assert!(KeyBinding::parse("").is_err());
    }

    #[test]
    fn test_default_keymap_parses() {
        let keymap = Keymap::from_config(&KeyBindings::default()).unwrap();
        assert_eq!(keymap.select, KeyBinding::new(KeyCode::Enter));
        assert_eq!(keymap.search.to_string(), "/");
    }
}
