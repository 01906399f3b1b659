// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH SIGTSTP SIGCONT

use crate::{Key, StdMutex, Transport, WidthChangedCallback, ok};
use crossterm::{event::{self, Event},
                terminal};
use std::{io::{self, IsTerminal},
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}}};

/// Shared list of resize callbacks. The watcher thread walks this on every resize.
pub type SafeWidthChangedCallbacks = Arc<StdMutex<Vec<WidthChangedCallback>>>;

/// The default [`Transport`]: `crossterm` for raw mode, key events and terminal size,
/// plus `signal-hook` on unix for resize notifications and job control.
pub struct CrosstermTransport {
    is_raw: AtomicBool,
    is_sleeping: AtomicBool,
    width_changed_callbacks: SafeWidthChangedCallbacks,
    #[cfg(unix)]
    resize_watcher: StdMutex<Option<signal_hook::iterator::Handle>>,
}

impl std::fmt::Debug for CrosstermTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermTransport")
            .field("is_raw", &self.is_raw)
            .field("is_sleeping", &self.is_sleeping)
            .finish_non_exhaustive()
    }
}

impl Default for CrosstermTransport {
    fn default() -> Self {
        Self {
            is_raw: AtomicBool::new(false),
            is_sleeping: AtomicBool::new(false),
            width_changed_callbacks: Arc::new(StdMutex::new(vec![])),
            #[cfg(unix)]
            resize_watcher: StdMutex::new(None),
        }
    }
}

impl CrosstermTransport {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl Transport for CrosstermTransport {
    fn read_key(&self) -> io::Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key_event) => {
                    if let Some(key) = Key::from_crossterm(key_event) {
                        return Ok(key);
                    }
                }
                // Resize is picked up by the watcher thread, the rest has no binding.
                _ => {}
            }
        }
    }

    fn enter_raw_mode(&self) -> io::Result<()> {
        if !self.is_raw.swap(true, Ordering::SeqCst) {
            terminal::enable_raw_mode()?;
        }
        ok!()
    }

    fn exit_raw_mode(&self) -> io::Result<()> {
        if self.is_raw.swap(false, Ordering::SeqCst) {
            terminal::disable_raw_mode()?;
        }
        ok!()
    }

    fn width(&self) -> u16 { terminal::size().map(|(cols, _rows)| cols).unwrap_or(0) }

    fn is_terminal(&self) -> bool { io::stdin().is_terminal() && io::stdout().is_terminal() }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    fn on_width_changed(&self, callback: WidthChangedCallback) {
        self.width_changed_callbacks.lock().unwrap().push(callback);

        #[cfg(unix)]
        {
            let mut resize_watcher = self.resize_watcher.lock().unwrap();
            if resize_watcher.is_none() {
                match unix::spawn_resize_watcher(self.width_changed_callbacks.clone()) {
                    Ok(handle) => *resize_watcher = Some(handle),
                    Err(err) => {
                        tracing::warn!(?err, "unable to watch for terminal resize");
                    }
                }
            }
        }
    }

    fn sleep_to_resume(&self) -> io::Result<()> {
        if self.is_sleeping.swap(true, Ordering::SeqCst) {
            return ok!();
        }
        let result = self.suspend_until_continued();
        self.is_sleeping.store(false, Ordering::SeqCst);
        result
    }

    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn close(&self) -> io::Result<()> {
        #[cfg(unix)]
        if let Some(handle) = self.resize_watcher.lock().unwrap().take() {
            handle.close();
        }
        self.exit_raw_mode()
    }
}

impl CrosstermTransport {
    #[cfg(unix)]
    fn suspend_until_continued(&self) -> io::Result<()> {
        let was_raw = self.is_raw.load(Ordering::SeqCst);
        self.exit_raw_mode()?;
        unix::stop_and_wait_for_continue()?;
        if was_raw {
            self.enter_raw_mode()?;
        }
        ok!()
    }

    #[cfg(not(unix))]
    fn suspend_until_continued(&self) -> io::Result<()> { ok!() }
}

#[cfg(unix)]
mod unix {
    use super::SafeWidthChangedCallbacks;
    use signal_hook::{consts::{SIGCONT, SIGTSTP, SIGWINCH},
                      iterator::{Handle, Signals},
                      low_level};
    use std::{io, thread};

    /// Runs every registered callback on each `SIGWINCH`, until the returned handle is
    /// closed.
    pub fn spawn_resize_watcher(
        callbacks: SafeWidthChangedCallbacks,
    ) -> io::Result<Handle> {
        let mut signals = Signals::new([SIGWINCH])?;
        let handle = signals.handle();
        thread::Builder::new()
            .name("readline-resize".into())
            .spawn(move || {
                for _ in signals.forever() {
                    let Ok(callbacks) = callbacks.lock() else {
                        break;
                    };
                    for callback in callbacks.iter() {
                        callback();
                    }
                }
            })?;
        Ok(handle)
    }

    /// Stop this process the same way the shell's <kbd>Ctrl+Z</kbd> would, then block
    /// until `SIGCONT` arrives.
    pub fn stop_and_wait_for_continue() -> io::Result<()> {
        // Register before stopping so that the continue can't be missed.
        let mut signals = Signals::new([SIGCONT])?;
        low_level::raise(SIGTSTP)?;
        let _ = signals.forever().next();
        signals.handle().close();
        Ok(())
    }
}
