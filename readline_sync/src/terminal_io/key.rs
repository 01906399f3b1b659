// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A decoded, platform independent key press. This is what the dispatch loop matches
/// on; raw terminal input never reaches it directly.
///
/// Letters carried by [`Key::Ctrl`] are always lower case ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Key {
    /// The zero key. Passed to the listener once when a read starts.
    Null,
    Char(char),
    Ctrl(char),
    Meta(char),
    Backspace,
    MetaBackspace,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    /// The transport's input stream has ended.
    Eof,
}

impl Key {
    /// Only these keys are inserted into the buffer when nothing else claims them.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Char(ch) if !ch.is_control())
    }

    /// Decode a crossterm key event. Returns [`None`] for releases, bare modifiers,
    /// function keys and anything else the editor has no binding for.
    ///
    /// Note that in raw mode a `\n` arrives as <kbd>Ctrl+J</kbd>, and some terminals
    /// report <kbd>Ctrl+H</kbd> as [`KeyCode::Backspace`]. Both end up on the same
    /// binding either way.
    #[must_use]
    pub fn from_crossterm(event: KeyEvent) -> Option<Key> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        let it = match event.code {
            KeyCode::Char(ch) if ctrl && ch.is_ascii_alphabetic() => {
                Key::Ctrl(ch.to_ascii_lowercase())
            }
            KeyCode::Char(_) if ctrl => return None,
            KeyCode::Char(ch) if alt => Key::Meta(ch.to_ascii_lowercase()),
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Backspace if alt => Key::MetaBackspace,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Delete => Key::Ctrl('d'),
            KeyCode::Home => Key::Ctrl('a'),
            KeyCode::End => Key::Ctrl('e'),
            _ => return None,
        };

        Some(it)
    }
}

impl From<char> for Key {
    fn from(ch: char) -> Self { Key::Char(ch) }
}
