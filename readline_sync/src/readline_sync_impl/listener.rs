// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::Key;

/// A replacement for the line being edited, returned by a [`Listener`] or a
/// [`HistoryNavigator`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSnapshot {
    pub line: Vec<char>,
    /// Clamped to `line.len()` when applied.
    pub cursor: usize,
}

impl LineSnapshot {
    pub fn new(line: impl Into<String>, cursor: usize) -> Self {
        Self { line: line.into().chars().collect(), cursor }
    }
}

/// Observe, and optionally rewrite, the line after every key.
///
/// The dispatch loop calls [`Listener::on_change()`] after each key has been applied to
/// the buffer, and once more with [`Key::Null`] and an empty line whenever a read
/// starts. Returning `Some` replaces the buffer's content and cursor; returning `None`
/// leaves the buffer alone.
pub trait Listener: Send + Sync {
    fn on_change(&self, line: &[char], cursor: usize, key: Key) -> Option<LineSnapshot>;
}

/// Plain closures work as listeners.
impl<F> Listener for F
where
    F: Fn(&[char], usize, Key) -> Option<LineSnapshot> + Send + Sync,
{
    fn on_change(&self, line: &[char], cursor: usize, key: Key) -> Option<LineSnapshot> {
        self(line, cursor, key)
    }
}

/// Where previous and next history entries come from. Storage and search aren't part of
/// this crate; this is the hook for them. Returning `None` rings the bell.
pub trait HistoryNavigator: Send + Sync {
    /// <kbd>Ctrl+P</kbd> or <kbd>Up</kbd>.
    fn previous(&self, current: &[char]) -> Option<Vec<char>>;

    /// <kbd>Ctrl+N</kbd> or <kbd>Down</kbd>.
    fn next(&self, current: &[char]) -> Option<Vec<char>>;
}
