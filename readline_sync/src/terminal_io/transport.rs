// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Key, ok};
use crossterm::{QueueableCommand, cursor,
                terminal::{Clear, ClearType}};
use std::io::{self, Write};

/// The callback that gets run whenever the terminal is resized.
pub type WidthChangedCallback = Box<dyn Fn() + Send + Sync>;

/// The terminal, as seen by the line editor. There is one implementation per platform
/// family, picked when the session is created; the dispatch loop only ever talks to
/// this trait.
///
/// All methods take `&self`. Implementations are shared between the caller's thread,
/// the dispatch loop thread, and the resize notification thread, so they must do
/// their own synchronization.
pub trait Transport: Send + Sync {
    /// Block until one key is available. Returns [`Key::Eof`] once the input stream is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Any error here is fatal for the session.
    fn read_key(&self) -> io::Result<Key>;

    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be changed.
    fn enter_raw_mode(&self) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be restored.
    fn exit_raw_mode(&self) -> io::Result<()>;

    /// Number of columns. `0` means unknown, which turns off wrap calculations.
    fn width(&self) -> u16;

    fn is_terminal(&self) -> bool;

    /// Register a callback to run after every resize. Registering more than once is
    /// allowed; all callbacks are kept.
    fn on_width_changed(&self, callback: WidthChangedCallback);

    /// Hand control back to the shell (job control stop) and return once the process
    /// is resumed.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode can't be left or re-entered.
    fn sleep_to_resume(&self) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    fn bell(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(b"\x07")?;
        out.flush()
    }

    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    fn clear_screen(&self, out: &mut dyn Write) -> io::Result<()> {
        out.queue(Clear(ClearType::All))?;
        out.queue(cursor::MoveTo(0, 0))?;
        out.flush()
    }

    /// Release anything the transport holds on to. Called once when the session is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport can't be shut down cleanly.
    fn close(&self) -> io::Result<()> { ok!() }
}
