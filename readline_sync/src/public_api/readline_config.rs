// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{HistoryNavigator, Key, LineSnapshot, Listener, SafeRawTerminal, StdMutex,
            WidthChangedCallback};
use std::{io,
          sync::{Arc, LazyLock}};

pub type FilterInputKeyFn = Arc<dyn Fn(Key) -> (Key, bool) + Send + Sync>;
pub type GetWidthFn = Arc<dyn Fn() -> u16 + Send + Sync>;
pub type IsTerminalFn = Arc<dyn Fn() -> bool + Send + Sync>;
pub type RawModeFn = Arc<dyn Fn() -> io::Result<()> + Send + Sync>;
pub type OnWidthChangedFn = Arc<dyn Fn(WidthChangedCallback) + Send + Sync>;

/// Process wide fallbacks, used when [`ReadlineConfig::stdout`] or
/// [`ReadlineConfig::stderr`] is not set.
static DEFAULT_STDOUT: LazyLock<SafeRawTerminal> =
    LazyLock::new(|| Arc::new(StdMutex::new(io::stdout())));
static DEFAULT_STDERR: LazyLock<SafeRawTerminal> =
    LazyLock::new(|| Arc::new(StdMutex::new(io::stderr())));

/// Everything that can be tuned about a [`crate::Readline`] session.
///
/// Once handed to a session the config is shared behind an [`Arc`] and never changed in
/// place. To change it, build a new one and pass it to
/// [`crate::Readline::replace_config()`].
///
/// The `get_width`, `is_terminal`, `make_raw`, `exit_raw` and `on_width_changed` hooks
/// override the matching [`crate::Transport`] method when set.
#[derive(Clone)]
pub struct ReadlineConfig {
    /// May contain ANSI escape sequences.
    pub prompt: String,

    pub listener: Option<Arc<dyn Listener>>,

    pub history: Option<Arc<dyn HistoryNavigator>>,

    /// Printed after the line on <kbd>Ctrl+C</kbd>. Empty means no banner.
    pub interrupt_prompt: String,

    /// Printed on <kbd>Ctrl+D</kbd> with an empty line. Empty means no banner.
    pub eof_prompt: String,

    pub enable_mask: bool,
    pub mask_rune: char,

    /// Erase the line from the screen when it is submitted, instead of leaving it there
    /// followed by a new row. Banners are not printed in this mode.
    pub unique_edit_line: bool,

    /// Runs on every key before it is dispatched. Returns the key to use instead, and
    /// whether to process it at all.
    pub filter_input_key: Option<FilterInputKeyFn>,

    pub get_width: Option<GetWidthFn>,
    pub is_terminal: Option<IsTerminalFn>,
    pub make_raw: Option<RawModeFn>,
    pub exit_raw: Option<RawModeFn>,
    pub on_width_changed: Option<OnWidthChangedFn>,

    /// Draw the line even if stdin / stdout are not a terminal.
    pub force_use_interactive: bool,

    pub stdout: Option<SafeRawTerminal>,
    pub stderr: Option<SafeRawTerminal>,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            listener: None,
            history: None,
            interrupt_prompt: "^C".into(),
            eof_prompt: "^D".into(),
            enable_mask: false,
            mask_rune: '*',
            unique_edit_line: false,
            filter_input_key: None,
            get_width: None,
            is_terminal: None,
            make_raw: None,
            exit_raw: None,
            on_width_changed: None,
            force_use_interactive: false,
            stdout: None,
            stderr: None,
        }
    }
}

impl std::fmt::Debug for ReadlineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadlineConfig")
            .field("prompt", &self.prompt)
            .field("listener", &self.listener.is_some())
            .field("history", &self.history.is_some())
            .field("interrupt_prompt", &self.interrupt_prompt)
            .field("eof_prompt", &self.eof_prompt)
            .field("enable_mask", &self.enable_mask)
            .field("mask_rune", &self.mask_rune)
            .field("unique_edit_line", &self.unique_edit_line)
            .field("filter_input_key", &self.filter_input_key.is_some())
            .field("force_use_interactive", &self.force_use_interactive)
            .finish_non_exhaustive()
    }
}

impl ReadlineConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Use a closure as the [`Listener`].
    #[must_use]
    pub fn set_listener(
        mut self,
        listener: impl Fn(&[char], usize, Key) -> Option<LineSnapshot> + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// The mask glyph, if masking is on.
    #[must_use]
    pub fn mask(&self) -> Option<char> { self.enable_mask.then_some(self.mask_rune) }

    #[must_use]
    pub fn stdout(&self) -> SafeRawTerminal {
        self.stdout.clone().unwrap_or_else(|| DEFAULT_STDOUT.clone())
    }

    #[must_use]
    pub fn stderr(&self) -> SafeRawTerminal {
        self.stderr.clone().unwrap_or_else(|| DEFAULT_STDERR.clone())
    }
}
