// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CrosstermTransport, Operation, ReadlineConfig, ReadlineError, ReadlineResult,
            SharedOutput, Transport, ok};
use std::{io::{self, Write},
          sync::Arc};

/// Print a line above the one being edited. Works between reads too.
#[macro_export]
macro_rules! rls_println {
    (
        $rls:ident,
        $($format:tt)*
    ) => {{
        use std::io::Write as _;
        _ = writeln!($rls.stdout(), $($format)*);
    }};
}

/// A blocking line editor session.
///
/// A session owns one background thread that reads keys. Each call to
/// [`Readline::read_line()`] wakes it up, and blocks until a line is submitted or a
/// signal ([`crate::ReadlineSignal`]) ends the read. Only one read can be in progress
/// at a time, which `&mut self` enforces.
///
/// ```no_run
/// # use r3bl_readline_sync::{Readline, ReadlineError, rls_println};
/// # fn main() -> Result<(), ReadlineError> {
/// let mut readline = Readline::try_new("> ")?;
/// let result = readline.read_line()?;
/// rls_println!(readline, "you typed: {}", result.line);
/// readline.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Readline {
    operation: Operation,
}

impl Readline {
    /// Session on the real terminal with the default config and the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::ThreadSpawn`] if the key dispatch thread can't be
    /// started.
    pub fn try_new(prompt: impl Into<String>) -> Result<Self, ReadlineError> {
        Self::try_new_with_config(ReadlineConfig::new(prompt))
    }

    /// # Errors
    ///
    /// See [`Readline::try_new()`].
    pub fn try_new_with_config(config: ReadlineConfig) -> Result<Self, ReadlineError> {
        Self::try_new_with_transport(config, Arc::new(CrosstermTransport::new()))
    }

    /// Session on any [`Transport`], for example
    /// [`crate::test_fixtures::ScriptedTransport`] in tests.
    ///
    /// # Errors
    ///
    /// See [`Readline::try_new()`].
    pub fn try_new_with_transport(
        config: ReadlineConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ReadlineError> {
        Ok(Self {
            operation: Operation::try_new(config, transport)?,
        })
    }

    /// Replacement for [`std::io::Stdin::read_line()`] with line editing. The returned
    /// line has no trailing newline.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::IO`] if the terminal fails. Close the session after this.
    /// - [`ReadlineError::Closed`] after [`Readline::close()`], or after an earlier
    ///   terminal failure.
    pub fn read_line(&mut self) -> Result<ReadlineResult<String>, ReadlineError> {
        let result = self.operation.read_runes()?;
        Ok(result.map(|line| line.into_iter().collect()))
    }

    /// Same as [`Readline::read_line()`], as UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// See [`Readline::read_line()`].
    pub fn read_line_bytes(&mut self) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        Ok(self.read_line()?.map(String::into_bytes))
    }

    /// Read a password. The input is masked, and no banner is shown on
    /// <kbd>Ctrl+C</kbd> or <kbd>Ctrl+D</kbd>. The session's config is restored
    /// afterwards, however the read ends.
    ///
    /// # Errors
    ///
    /// See [`Readline::read_line()`].
    pub fn read_password(
        &mut self,
        prompt: impl Into<String>,
    ) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        let config = ReadlineConfig {
            prompt: prompt.into(),
            ..self.password_config()
        };
        self.read_password_with_config(config)
    }

    /// [`Readline::read_password()`] with a listener, for example to show password
    /// strength as it is typed.
    ///
    /// # Errors
    ///
    /// See [`Readline::read_line()`].
    pub fn read_password_with_listener(
        &mut self,
        prompt: impl Into<String>,
        listener: impl Fn(&[char], usize, crate::Key) -> Option<crate::LineSnapshot>
        + Send
        + Sync
        + 'static,
    ) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        let config = ReadlineConfig {
            prompt: prompt.into(),
            ..self.password_config()
        }
        .set_listener(listener);
        self.read_password_with_config(config)
    }

    /// Read a password with a config of your own; start from
    /// [`Readline::password_config()`].
    ///
    /// # Errors
    ///
    /// See [`Readline::read_line()`].
    pub fn read_password_with_config(
        &mut self,
        config: ReadlineConfig,
    ) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        self.operation.read_password_with_config(config)
    }

    /// The config [`Readline::read_password()`] uses.
    #[must_use]
    pub fn password_config(&self) -> ReadlineConfig { self.operation.password_config() }

    /// Snapshot of the active config.
    #[must_use]
    pub fn config(&self) -> Arc<ReadlineConfig> { self.operation.terminal.config() }

    /// Swap in a new config. Returns the previous one. Passing the active config back
    /// in does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is on screen and redrawing it fails.
    pub fn replace_config(
        &mut self,
        config: impl Into<Arc<ReadlineConfig>>,
    ) -> Result<Arc<ReadlineConfig>, ReadlineError> {
        self.operation.replace_config(config.into())
    }

    /// # Errors
    ///
    /// Returns an error if the line is on screen and redrawing it fails.
    pub fn set_prompt(&self, prompt: &str) -> io::Result<()> {
        self.operation.set_prompt(prompt)
    }

    /// `Some` masks every code point with the given glyph, `None` shows the text.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is on screen and redrawing it fails.
    pub fn set_mask(&self, mask: Option<char>) -> io::Result<()> {
        self.operation.set_mask(mask)
    }

    /// Write to stdout without disturbing the line being edited.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut it = self.stdout();
        it.write_all(bytes)?;
        ok!(bytes.len())
    }

    /// Writer for stdout that redraws the line being edited below whatever is written.
    #[must_use]
    pub fn stdout(&self) -> SharedOutput { self.operation.stdout() }

    /// Same as [`Readline::stdout()`], for the configured stderr.
    #[must_use]
    pub fn stderr(&self) -> SharedOutput { self.operation.stderr() }

    /// Set the terminal window title.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn set_title(&self, title: &str) -> io::Result<()> {
        let mut it = self.stdout();
        write!(it, "\x1b]2;{title}\x07")?;
        it.flush()
    }

    /// Erase the line from the screen. It comes back with the next redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn clean(&self) -> io::Result<()> { self.operation.clean() }

    /// Redraw the line, if a read is in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn refresh(&self) -> io::Result<()> { self.operation.refresh() }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.operation.is_closed() }

    /// Stop the key dispatch thread and restore the terminal. Closing twice is fine;
    /// reads after closing return [`ReadlineError::Closed`]. Dropping the session
    /// closes it too.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be restored.
    pub fn close(&mut self) -> Result<(), ReadlineError> { self.operation.close() }
}
