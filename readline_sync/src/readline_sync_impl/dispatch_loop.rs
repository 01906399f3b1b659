// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Handoff, Key, LineBuffer, LoopSignal, ReadlineConfig, ReadlineError,
            SafeHandoff, SafeLineBuffer, Terminal, ok};
use std::{io,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering},
                 mpsc::Receiver},
          thread::{self, JoinHandle}};

/// The one background thread of a session.
///
/// It sleeps until it is kicked by a read request, then reads and applies keys until a
/// line is submitted or a signal ends the read. The result goes into the handoff, and
/// the thread goes back to sleep. It ends when the kick sender is dropped, when the
/// handoff is closed, or after a transport failure.
///
/// # Key table
///
/// The table lives in [`DispatchLoop::dispatch()`]. Keys that are not bound and are not
/// printable are ignored. Rejected operations (backspace at the start of the line, and
/// so on) ring the bell.
pub struct DispatchLoop {
    pub buffer: SafeLineBuffer,
    pub terminal: Terminal,
    pub handoff: SafeHandoff,
    /// `true` from the moment a read is requested until its result is handed off.
    /// [`crate::SharedOutput`] uses this to decide whether the line needs to be erased
    /// and redrawn around a write.
    pub is_reading: Arc<AtomicBool>,
    pub kick_receiver: Receiver<()>,
}

impl std::fmt::Debug for DispatchLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchLoop")
            .field("is_reading", &self.is_reading)
            .finish_non_exhaustive()
    }
}

impl DispatchLoop {
    /// # Errors
    ///
    /// Returns [`ReadlineError::ThreadSpawn`] if the OS refuses to create the thread.
    pub fn spawn(self) -> Result<JoinHandle<()>, ReadlineError> {
        thread::Builder::new()
            .name("readline-dispatch".into())
            .spawn(move || self.run())
            .map_err(ReadlineError::ThreadSpawn)
    }

    fn run(self) {
        while self.kick_receiver.recv().is_ok() {
            let handoff = self.read_until_emit();
            self.is_reading.store(false, Ordering::SeqCst);

            let is_fatal = matches!(handoff, Handoff::Signal(LoopSignal::TransportFailure(_)));
            let is_delivered = match handoff {
                Handoff::Line(line) => {
                    tracing::debug!(len = line.len(), "line submitted");
                    self.handoff.send_line(line)
                }
                Handoff::Signal(signal) => {
                    tracing::debug!(?signal, "read ended with signal");
                    self.handoff.send_signal(signal)
                }
            };

            if is_fatal || !is_delivered {
                break;
            }
        }

        self.handoff.close();
        tracing::debug!("dispatch loop exited");
    }

    fn read_until_emit(&self) -> Handoff {
        loop {
            match self.process_next_key() {
                Ok(Some(handoff)) => return handoff,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(?err, "terminal transport failed");
                    return Handoff::Signal(LoopSignal::TransportFailure(err));
                }
            }
        }
    }

    /// Read one key and apply it. Returns `Some` when the read cycle is over.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn process_next_key(&self) -> io::Result<Option<Handoff>> {
        let key = self.terminal.read_key()?;
        tracing::trace!(?key, "key");

        let config = self.terminal.config();

        let key = match &config.filter_input_key {
            Some(filter) => match filter(key) {
                (key, true) => key,
                (_, false) => {
                    self.buffer.lock().unwrap().refresh()?;
                    return ok!(None);
                }
            },
            None => key,
        };

        let mut buffer = self.buffer.lock().unwrap();

        // End of stream flushes a pending line first. The next read sees the end of
        // stream again, with an empty buffer this time.
        let key = match key {
            Key::Eof if buffer.is_empty() => {
                buffer.clean()?;
                return ok!(Some(Handoff::Signal(LoopSignal::EndOfInput)));
            }
            Key::Eof => Key::Enter,
            _ => key,
        };

        let it = self.dispatch(&mut buffer, &config, key)?;

        if let Some(listener) = &config.listener
            && let Some(snapshot) = listener.on_change(buffer.content(), buffer.cursor(), key)
        {
            buffer.set_with_idx(snapshot.cursor, snapshot.line)?;
        }

        ok!(it)
    }

    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn dispatch(
        &self,
        buffer: &mut LineBuffer,
        config: &ReadlineConfig,
        key: Key,
    ) -> io::Result<Option<Handoff>> {
        match key {
            // Completion, cancel, history search and word transpose have no
            // implementation.
            Key::Tab | Key::Ctrl('g' | 'r' | 's') | Key::Meta('t') => self.bell(buffer)?,

            Key::Ctrl('a') => buffer.move_to_line_start()?,
            Key::Ctrl('e') => buffer.move_to_line_end()?,
            Key::Ctrl('b') | Key::Left => {
                if !buffer.move_backward()? {
                    self.bell(buffer)?;
                }
            }
            Key::Ctrl('f') | Key::Right => {
                if !buffer.move_forward()? {
                    self.bell(buffer)?;
                }
            }
            Key::Meta('b') => buffer.move_to_prev_word()?,
            Key::Meta('f') => buffer.move_to_next_word()?,

            Key::Ctrl('h') | Key::Backspace => {
                if !buffer.backspace()? {
                    self.bell(buffer)?;
                }
            }
            Key::Ctrl('d') if buffer.is_empty() => {
                return ok!(Some(end_of_input(buffer, config)?));
            }
            Key::Ctrl('d') => {
                if !buffer.delete_forward()? {
                    self.bell(buffer)?;
                }
            }
            Key::Meta('d') => buffer.delete_word()?,
            Key::Ctrl('w') | Key::MetaBackspace => buffer.back_escape_word()?,
            Key::Ctrl('k') => buffer.kill()?,
            Key::Ctrl('u') => buffer.kill_front()?,
            Key::Ctrl('t') => buffer.transpose()?,

            Key::Ctrl('p') | Key::Up => self.navigate_history(buffer, config, true)?,
            Key::Ctrl('n') | Key::Down => self.navigate_history(buffer, config, false)?,

            Key::Ctrl('l') => {
                if buffer.is_interactive() {
                    let terminal = &self.terminal;
                    buffer.refresh_with(|it| {
                        let output = it.output();
                        let mut term = output.lock().unwrap();
                        terminal.clear_screen(&mut *term)
                    })??;
                }
            }
            Key::Ctrl('z') => {
                buffer.clean()?;
                self.terminal.sleep_to_resume()?;
                buffer.refresh()?;
            }

            Key::Ctrl('j') | Key::Enter => return ok!(Some(submit(buffer, config)?)),
            Key::Ctrl('c') => return ok!(Some(interrupt(buffer, config)?)),

            Key::Char(ch) if key.is_printable() => buffer.insert(ch)?,

            _ => {}
        }

        ok!(None)
    }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn bell(&self, buffer: &LineBuffer) -> io::Result<()> {
        if !buffer.is_interactive() {
            return ok!();
        }
        let output = buffer.output();
        let mut term = output.lock().unwrap();
        self.terminal.bell(&mut *term)
    }

    fn navigate_history(
        &self,
        buffer: &mut LineBuffer,
        config: &ReadlineConfig,
        is_previous: bool,
    ) -> io::Result<()> {
        let replacement = config.history.as_ref().and_then(|history| {
            if is_previous {
                history.previous(buffer.content())
            } else {
                history.next(buffer.content())
            }
        });

        match replacement {
            Some(line) => buffer.set_with_idx(line.len(), line),
            None => self.bell(buffer),
        }
    }
}

/// Leave the submitted line on screen followed by a new row, or erase it in erase on
/// submit mode.
fn submit(buffer: &mut LineBuffer, config: &ReadlineConfig) -> io::Result<Handoff> {
    buffer.move_to_line_end()?;

    let line = if config.unique_edit_line {
        buffer.clean()?;
        buffer.reset()
    } else {
        buffer.insert('\n')?;
        let mut it = buffer.reset();
        it.pop();
        it
    };

    ok!(Handoff::Line(line))
}

fn end_of_input(buffer: &mut LineBuffer, config: &ReadlineConfig) -> io::Result<Handoff> {
    if !config.unique_edit_line {
        buffer.insert_str(&format!("{}\n", config.eof_prompt))?;
    }
    buffer.reset();
    if config.unique_edit_line {
        buffer.clean()?;
    }

    ok!(Handoff::Signal(LoopSignal::EndOfInput))
}

/// Show the interrupt banner after the line and hand back what was typed, minus the
/// banner.
fn interrupt(buffer: &mut LineBuffer, config: &ReadlineConfig) -> io::Result<Handoff> {
    buffer.move_to_line_end()?;
    buffer.refresh()?;

    let remaining = if config.unique_edit_line {
        buffer.clean()?;
        buffer.reset()
    } else {
        let banner = format!("{}\n", config.interrupt_prompt);
        buffer.insert_str(&banner)?;
        let mut it = buffer.reset();
        it.truncate(it.len() - banner.chars().count());
        it
    };

    ok!(Handoff::Signal(LoopSignal::Interrupt(remaining)))
}
