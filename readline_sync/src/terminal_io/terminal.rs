// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Key, ReadlineConfig, StdMutex, Transport, WidthChangedCallback};
use std::{io::{self, Write},
          sync::Arc};

/// The configuration shared by the session, the dispatch loop, and the terminal. It is
/// only ever swapped as a whole (see [`crate::Readline::replace_config()`]).
pub type SafeConfig = Arc<StdMutex<Arc<ReadlineConfig>>>;

/// A [`Transport`] with the configuration's override hooks applied on top. Every part
/// of the crate goes through this, never through the transport directly, so that an
/// override like [`ReadlineConfig::get_width`] is seen everywhere.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct Terminal {
    pub transport: Arc<dyn Transport>,
    pub config: SafeConfig,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal").finish_non_exhaustive()
    }
}

impl Terminal {
    pub fn new(transport: Arc<dyn Transport>, config: SafeConfig) -> Self {
        Self { transport, config }
    }

    /// A snapshot of the active configuration.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[must_use]
    pub fn config(&self) -> Arc<ReadlineConfig> { self.config.lock().unwrap().clone() }

    /// # Errors
    ///
    /// Returns an error if reading from the transport fails.
    pub fn read_key(&self) -> io::Result<Key> { self.transport.read_key() }

    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be changed.
    pub fn enter_raw_mode(&self) -> io::Result<()> {
        match &self.config().make_raw {
            Some(make_raw) => make_raw(),
            None => self.transport.enter_raw_mode(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be restored.
    pub fn exit_raw_mode(&self) -> io::Result<()> {
        match &self.config().exit_raw {
            Some(exit_raw) => exit_raw(),
            None => self.transport.exit_raw_mode(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        match &self.config().get_width {
            Some(get_width) => get_width(),
            None => self.transport.width(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match &self.config().is_terminal {
            Some(is_terminal) => is_terminal(),
            None => self.transport.is_terminal(),
        }
    }

    /// Whether the line should be drawn at all.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.config().force_use_interactive || self.is_terminal()
    }

    pub fn on_width_changed(&self, callback: WidthChangedCallback) {
        match &self.config().on_width_changed {
            Some(on_width_changed) => on_width_changed(callback),
            None => self.transport.on_width_changed(callback),
        }
    }

    /// # Errors
    ///
    /// Returns an error if raw mode can't be left or re-entered.
    pub fn sleep_to_resume(&self) -> io::Result<()> { self.transport.sleep_to_resume() }

    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn bell(&self, out: &mut dyn Write) -> io::Result<()> { self.transport.bell(out) }

    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn clear_screen(&self, out: &mut dyn Write) -> io::Result<()> {
        self.transport.clear_screen(out)
    }

    /// # Errors
    ///
    /// Returns an error if the transport can't be shut down cleanly.
    pub fn close(&self) -> io::Result<()> { self.transport.close() }
}
