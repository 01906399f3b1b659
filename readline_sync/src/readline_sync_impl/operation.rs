// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DispatchLoop, Handoff, HandoffSlots, Key, LineBuffer, LoopSignal,
            PasswordMode, ReadlineConfig, ReadlineError, ReadlineResult, ReadlineSignal,
            SafeConfig, SafeHandoff, SafeLineBuffer, SharedOutput, StdMutex, Terminal,
            Transport, ok};
use std::{io,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering},
                 mpsc::{self, SyncSender, TrySendError}},
          thread::JoinHandle};

/// The engine behind [`crate::Readline`]: owns the dispatch loop thread, and bridges it
/// to a synchronous caller.
///
/// The bridge is a kick channel (caller to loop, "start reading") and the
/// [`HandoffSlots`] (loop to caller, "here is the line" or "here is why there is no
/// line").
pub struct Operation {
    pub buffer: SafeLineBuffer,
    pub terminal: Terminal,
    pub is_reading: Arc<AtomicBool>,
    handoff: SafeHandoff,
    /// [`None`] once closed.
    kick_sender: Option<SyncSender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("buffer", &self.buffer)
            .field("is_reading", &self.is_reading)
            .field("is_closed", &self.kick_sender.is_none())
            .finish_non_exhaustive()
    }
}

/// Leaves raw mode when dropped, whichever way the read ended.
struct RawModeGuard<'a> {
    terminal: &'a Terminal,
}

impl<'a> RawModeGuard<'a> {
    fn enter(terminal: &'a Terminal, is_interactive: bool) -> io::Result<Option<Self>> {
        if !is_interactive {
            return ok!(None);
        }
        terminal.enter_raw_mode()?;
        ok!(Some(Self { terminal }))
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.terminal.exit_raw_mode() {
            tracing::warn!(?err, "unable to exit raw mode");
        }
    }
}

impl Operation {
    /// Start the dispatch loop thread and register for resize notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::ThreadSpawn`] if the thread can't be started.
    pub fn try_new(
        config: ReadlineConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ReadlineError> {
        let config: SafeConfig = Arc::new(StdMutex::new(Arc::new(config)));
        let terminal = Terminal::new(transport, config);

        let buffer = {
            let config = terminal.config();
            let mut it = LineBuffer::new(&config.prompt, terminal.width(), config.stdout());
            it.set_mask(config.mask());
            it.set_interactive(terminal.is_interactive());
            Arc::new(StdMutex::new(it))
        };

        let is_reading = Arc::new(AtomicBool::new(false));
        let handoff = HandoffSlots::new();
        let (kick_sender, kick_receiver) = mpsc::sync_channel(1);

        let join_handle = DispatchLoop {
            buffer: buffer.clone(),
            terminal: terminal.clone(),
            handoff: handoff.clone(),
            is_reading: is_reading.clone(),
            kick_receiver,
        }
        .spawn()?;

        register_width_changed(&terminal, &buffer, &is_reading);

        tracing::debug!(is_interactive = buffer_is_interactive(&buffer), "readline session started");

        Ok(Self {
            buffer,
            terminal,
            is_reading,
            handoff,
            kick_sender: Some(kick_sender),
            join_handle: Some(join_handle),
        })
    }

    /// Read one line. Enters raw mode, draws the prompt, wakes the dispatch loop and
    /// waits for it to hand something back. Raw mode is left on every return path.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::IO`] if the terminal fails. The session should be closed.
    /// - [`ReadlineError::Closed`] if the session was closed, or an earlier terminal
    ///   failure ended the dispatch loop.
    pub fn read_runes(&mut self) -> Result<ReadlineResult<Vec<char>>, ReadlineError> {
        let Some(kick_sender) = &self.kick_sender else {
            return Err(ReadlineError::Closed);
        };
        if self.handoff.is_closed() {
            return Err(ReadlineError::Closed);
        }

        let is_interactive = buffer_is_interactive(&self.buffer);
        let _raw_mode_guard = RawModeGuard::enter(&self.terminal, is_interactive)?;

        if let Some(listener) = &self.terminal.config().listener {
            // Only for its side effects.
            let _unused = listener.on_change(&[], 0, Key::Null);
        }

        self.is_reading.store(true, Ordering::SeqCst);
        let kicked = self.render_prompt().and_then(|()| match kick_sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => ok!(),
            Err(TrySendError::Disconnected(())) => Err(ReadlineError::Closed),
        });
        if let Err(err) = kicked {
            self.is_reading.store(false, Ordering::SeqCst);
            return Err(err);
        }

        match self.handoff.recv() {
            Some(Handoff::Line(line)) => Ok(ReadlineResult::new(line, None)),
            Some(Handoff::Signal(LoopSignal::EndOfInput)) => {
                Ok(ReadlineResult::new(vec![], Some(ReadlineSignal::EndOfInput)))
            }
            Some(Handoff::Signal(LoopSignal::Interrupt(line))) => {
                Ok(ReadlineResult::new(line, Some(ReadlineSignal::Interrupt)))
            }
            Some(Handoff::Signal(LoopSignal::TransportFailure(err))) => Err(err.into()),
            None => Err(ReadlineError::Closed),
        }
    }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn render_prompt(&self) -> Result<(), ReadlineError> {
        self.buffer.lock().unwrap().refresh()?;
        ok!()
    }

    /// Redraw the line, only while a read is in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn refresh(&self) -> io::Result<()> {
        if !self.is_reading.load(Ordering::SeqCst) {
            return ok!();
        }
        self.buffer.lock().unwrap().refresh()
    }

    /// Erase the line from the screen.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn clean(&self) -> io::Result<()> { self.buffer.lock().unwrap().clean() }

    /// Change the prompt. A line that is on screen is redrawn with it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn set_prompt(&self, prompt: &str) -> io::Result<()> {
        let mut buffer = self.buffer.lock().unwrap();
        if self.is_reading.load(Ordering::SeqCst) {
            buffer.refresh_with(|it| it.set_prompt(prompt))
        } else {
            buffer.set_prompt(prompt);
            ok!()
        }
    }

    /// Turn masked rendering on (`Some`) or off (`None`).
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn set_mask(&self, mask: Option<char>) -> io::Result<()> {
        let mut buffer = self.buffer.lock().unwrap();
        if self.is_reading.load(Ordering::SeqCst) {
            buffer.refresh_with(|it| it.set_mask(mask))
        } else {
            buffer.set_mask(mask);
            ok!()
        }
    }

    /// Swap in a new configuration, and update the prompt, mask, output device, width
    /// and interactivity of the line to match it. Returns the previous configuration.
    /// Passing the configuration that is already active does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is on screen and redrawing it fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn replace_config(
        &mut self,
        config: Arc<ReadlineConfig>,
    ) -> Result<Arc<ReadlineConfig>, ReadlineError> {
        let old_config = {
            let mut current = self.terminal.config.lock().unwrap();
            if Arc::ptr_eq(&current, &config) {
                return Ok(config);
            }
            std::mem::replace(&mut *current, config.clone())
        };

        let is_interactive = self.terminal.is_interactive();
        let width = self.terminal.width();
        let apply = |it: &mut LineBuffer| {
            it.set_prompt(&config.prompt);
            it.set_mask(config.mask());
            it.set_output(config.stdout());
            it.set_interactive(is_interactive);
            it.set_width(width);
        };

        {
            let mut buffer = self.buffer.lock().unwrap();
            if self.is_reading.load(Ordering::SeqCst) {
                buffer.refresh_with(apply)?;
            } else {
                apply(&mut buffer);
            }
        }

        tracing::debug!(mask = config.enable_mask, "config replaced");
        Ok(old_config)
    }

    /// The configuration used for password reads: masked, no banners, and the same
    /// output devices and terminal hooks as the active configuration.
    #[must_use]
    pub fn password_config(&self) -> ReadlineConfig {
        let current = self.terminal.config();
        ReadlineConfig {
            enable_mask: true,
            interrupt_prompt: String::new(),
            eof_prompt: String::new(),
            get_width: current.get_width.clone(),
            is_terminal: current.is_terminal.clone(),
            make_raw: current.make_raw.clone(),
            exit_raw: current.exit_raw.clone(),
            on_width_changed: current.on_width_changed.clone(),
            force_use_interactive: current.force_use_interactive,
            stdout: Some(current.stdout()),
            stderr: Some(current.stderr()),
            ..Default::default()
        }
    }

    /// Read a password with the given config in place of the active one. The active
    /// config is restored however the read ends.
    ///
    /// # Errors
    ///
    /// See [`Operation::read_runes()`].
    pub fn read_password_with_config(
        &mut self,
        config: ReadlineConfig,
    ) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        let mut password_mode = PasswordMode::enter(self, config)?;
        password_mode.read()
    }

    /// A writer for the line's output device that keeps the line intact.
    #[must_use]
    pub fn stdout(&self) -> SharedOutput {
        SharedOutput::new_line_output(self.buffer.clone(), self.is_reading.clone())
    }

    /// A writer for the configured stderr that keeps the line intact.
    #[must_use]
    pub fn stderr(&self) -> SharedOutput {
        SharedOutput::new(
            self.terminal.config().stderr(),
            self.buffer.clone(),
            self.is_reading.clone(),
        )
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.kick_sender.is_none() }

    /// Stop the dispatch loop, leave raw mode and release the transport. Closing twice
    /// is fine.
    ///
    /// The loop thread is joined if it is parked between reads. If it is blocked on a
    /// key read it is left to end on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be restored.
    pub fn close(&mut self) -> Result<(), ReadlineError> {
        let Some(kick_sender) = self.kick_sender.take() else {
            return ok!();
        };
        drop(kick_sender);
        self.handoff.close();

        let result = self
            .terminal
            .exit_raw_mode()
            .and_then(|()| self.terminal.close());

        if let Some(join_handle) = self.join_handle.take()
            && !self.is_reading.load(Ordering::SeqCst)
            && join_handle.join().is_err()
        {
            tracing::warn!("dispatch loop panicked");
        }

        tracing::debug!("readline session closed");
        result.map_err(ReadlineError::from)
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(?err, "unable to close readline session");
        }
    }
}

/// # Panics
///
/// This will panic if the lock is poisoned.
fn buffer_is_interactive(buffer: &SafeLineBuffer) -> bool {
    buffer.lock().unwrap().is_interactive()
}

/// Keep the buffer's width current. While a read is in progress the line is redrawn
/// with the new width. The callback holds no strong references, so it turns into a
/// no-op once the session is gone.
fn register_width_changed(
    terminal: &Terminal,
    buffer: &SafeLineBuffer,
    is_reading: &Arc<AtomicBool>,
) {
    let transport = Arc::downgrade(&terminal.transport);
    let config = Arc::downgrade(&terminal.config);
    let buffer = Arc::downgrade(buffer);
    let is_reading = Arc::downgrade(is_reading);

    terminal.on_width_changed(Box::new(move || {
        let (Some(transport), Some(config), Some(buffer), Some(is_reading)) = (
            transport.upgrade(),
            config.upgrade(),
            buffer.upgrade(),
            is_reading.upgrade(),
        ) else {
            return;
        };

        let width = Terminal::new(transport, config).width();
        let result = match buffer.lock() {
            Ok(mut buffer) if is_reading.load(Ordering::SeqCst) => {
                buffer.on_width_change(width)
            }
            Ok(mut buffer) => {
                buffer.set_width(width);
                ok!()
            }
            Err(_) => ok!(),
        };

        // Logged after the lock is released, since the log may go to a SharedOutput.
        if let Err(err) = result {
            tracing::warn!(?err, "unable to redraw after resize");
        }
    }));
}
