//! Key Module - Key events consumed by activation loops
//!
//! A [`Key`] is the unit of input every widget processes. Real keys come
//! from crossterm; preset sequences come from [`parse_keys`], which reads
//! the same token names [`Key`]'s `Display` writes. Parsing what `Display`
//! wrote gives the same keys back, as long as `Ctrl` letters are lowercase.
//!
//! # Example
//!
//! ```
//! use cdk_tui::key::{parse_keys, Key};
//!
//! let keys = parse_keys("ok<Enter>").unwrap();
//! assert_eq!(keys, vec![Key::Char('o'), Key::Char('k'), Key::Enter]);
//! ```

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

// =============================================================================
// TYPES
// =============================================================================

/// One input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// A letter pressed with Control, always lowercase.
    Ctrl(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Null,
}

impl Key {
    /// Check if this key inserts a printable character.
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Char(c) if !c.is_control())
    }
}

// =============================================================================
// CROSSTERM CONVERSION
// =============================================================================

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        match event.code {
            KeyCode::Char(c) if ctrl => Key::Ctrl(c.to_ascii_lowercase()),
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab if shift => Key::BackTab,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Insert => Key::Insert,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Null,
        }
    }
}

// =============================================================================
// TOKEN NAMES
// =============================================================================

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('<') => f.write_str("<lt>"),
            Key::Char(' ') => f.write_str("<Space>"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Ctrl(c) => write!(f, "<C-{}>", c),
            Key::Enter => f.write_str("<Enter>"),
            Key::Tab => f.write_str("<Tab>"),
            Key::BackTab => f.write_str("<BackTab>"),
            Key::Backspace => f.write_str("<Backspace>"),
            Key::Escape => f.write_str("<Esc>"),
            Key::Delete => f.write_str("<Del>"),
            Key::Up => f.write_str("<Up>"),
            Key::Down => f.write_str("<Down>"),
            Key::Left => f.write_str("<Left>"),
            Key::Right => f.write_str("<Right>"),
            Key::Home => f.write_str("<Home>"),
            Key::End => f.write_str("<End>"),
            Key::PageUp => f.write_str("<PageUp>"),
            Key::PageDown => f.write_str("<PageDown>"),
            Key::Insert => f.write_str("<Insert>"),
            Key::F(n) => write!(f, "<F{}>", n),
            Key::Null => f.write_str("<Null>"),
        }
    }
}

/// A preset key sequence could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unknown key name <{0}>")]
    UnknownName(String),
    #[error("unterminated '<' at byte {0}")]
    Unterminated(usize),
}

fn named_key(name: &str) -> Option<Key> {
    let key = match name {
        "Enter" | "CR" => Key::Enter,
        "Tab" => Key::Tab,
        "BackTab" | "S-Tab" => Key::BackTab,
        "Esc" | "Escape" => Key::Escape,
        "Backspace" | "BS" => Key::Backspace,
        "Del" | "Delete" => Key::Delete,
        "Up" => Key::Up,
        "Down" => Key::Down,
        "Left" => Key::Left,
        "Right" => Key::Right,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "Insert" => Key::Insert,
        "Space" => Key::Char(' '),
        "lt" => Key::Char('<'),
        "Null" => Key::Null,
        _ => {
            if let Some(rest) = name.strip_prefix("C-") {
                let mut chars = rest.chars();
                return match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Ctrl(c.to_ascii_lowercase())),
                    _ => None,
                };
            }
            Key::F(name.strip_prefix('F')?.parse::<u8>().ok()?)
        }
    };
    Some(key)
}

/// The one token whose name holds a `>`.
const CTRL_GT: &str = "<C->>";

/// Parse a preset key sequence such as `"abc<Enter>"` or `"<Down><Space><Enter>"`.
pub fn parse_keys(input: &str) -> Result<Vec<Key>, KeyParseError> {
    let mut keys = Vec::new();
    let mut rest = input;
    let mut offset = 0;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with(CTRL_GT) {
            keys.push(Key::Ctrl('>'));
            offset += CTRL_GT.len();
            rest = &rest[CTRL_GT.len()..];
        } else if c == '<' {
            let Some(end) = rest.find('>') else {
                return Err(KeyParseError::Unterminated(offset));
            };
            let name = &rest[1..end];
            let key = named_key(name).ok_or_else(|| KeyParseError::UnknownName(name.to_string()))?;
            keys.push(key);
            offset += end + 1;
            rest = &rest[end + 1..];
        } else {
            keys.push(Key::Char(c));
            offset += c.len_utf8();
            rest = &rest[c.len_utf8()..];
        }
    }

    Ok(keys)
}

/// Render a key sequence back into its textual form.
pub fn format_keys(keys: &[Key]) -> String {
    keys.iter().map(|k| k.to_string()).collect()
}

// =============================================================================
// TESTS
// =============================================================================
