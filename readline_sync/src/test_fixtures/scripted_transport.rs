// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Key, StdMutex, Transport, WidthChangedCallback, ok};
use std::{collections::VecDeque,
          io::{self, Write},
          sync::{Condvar,
                 atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering}}};

/// One entry of a [`ScriptedTransport`] script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Key(Key),
    /// Change the width and run the resize callbacks, on the dispatch loop thread,
    /// before the next key is read.
    Resize(u16),
    /// Block the dispatch loop until [`ScriptedTransport::resume()`] is called. Use
    /// [`ScriptedTransport::wait_until_paused()`] to know that a read is in progress.
    Pause,
}

impl From<Key> for ScriptStep {
    fn from(key: Key) -> Self { ScriptStep::Key(key) }
}

/// What [`Transport::read_key()`] does once the script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEnd {
    Eof,
    Fail(io::ErrorKind),
}

/// Keys for each code point of `text`.
pub fn type_text(text: &str) -> impl Iterator<Item = ScriptStep> + '_ {
    text.chars().map(|ch| ScriptStep::Key(Key::Char(ch)))
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<ScriptStep>,
    is_paused: bool,
}

/// A [`Transport`] that replays a script instead of reading a terminal, and counts how
/// the session used it.
///
/// ```
/// # use r3bl_readline_sync::{Key, test_fixtures::{ScriptStep, ScriptedTransport, type_text}};
/// let transport =
///     ScriptedTransport::new(type_text("hi").chain([ScriptStep::Key(Key::Enter)]));
/// # let _ = transport;
/// ```
pub struct ScriptedTransport {
    script: StdMutex<Script>,
    paused_changed: Condvar,
    end: ScriptEnd,
    width: AtomicU16,
    is_terminal: AtomicBool,
    width_changed_callbacks: StdMutex<Vec<WidthChangedCallback>>,
    pub bell_count: AtomicUsize,
    pub raw_mode_entry_count: AtomicUsize,
    pub raw_mode_exit_count: AtomicUsize,
    pub suspend_count: AtomicUsize,
    pub clear_screen_count: AtomicUsize,
    pub is_closed: AtomicBool,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("end", &self.end)
            .field("width", &self.width)
            .field("bell_count", &self.bell_count)
            .finish_non_exhaustive()
    }
}

impl ScriptedTransport {
    /// 80 columns, a terminal, and [`Key::Eof`] after the last step.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            script: StdMutex::new(Script {
                steps: steps.into_iter().collect(),
                is_paused: false,
            }),
            paused_changed: Condvar::new(),
            end: ScriptEnd::Eof,
            width: AtomicU16::new(80),
            is_terminal: AtomicBool::new(true),
            width_changed_callbacks: StdMutex::new(vec![]),
            bell_count: AtomicUsize::new(0),
            raw_mode_entry_count: AtomicUsize::new(0),
            raw_mode_exit_count: AtomicUsize::new(0),
            suspend_count: AtomicUsize::new(0),
            clear_screen_count: AtomicUsize::new(0),
            is_closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_width(self, width: u16) -> Self {
        self.width.store(width, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: ScriptEnd) -> Self {
        self.end = end;
        self
    }

    #[must_use]
    pub fn with_is_terminal(self, is_terminal: bool) -> Self {
        self.is_terminal.store(is_terminal, Ordering::SeqCst);
        self
    }

    /// Change the width and run the resize callbacks on the calling thread.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn resize(&self, width: u16) {
        self.width.store(width, Ordering::SeqCst);
        for callback in self.width_changed_callbacks.lock().unwrap().iter() {
            callback();
        }
    }

    /// Block until the dispatch loop reaches a [`ScriptStep::Pause`].
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn wait_until_paused(&self) {
        let mut script = self.script.lock().unwrap();
        while !script.is_paused {
            script = self.paused_changed.wait(script).unwrap();
        }
    }

    /// Let the dispatch loop continue past a [`ScriptStep::Pause`].
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn resume(&self) {
        self.script.lock().unwrap().is_paused = false;
        self.paused_changed.notify_all();
    }

    #[must_use]
    pub fn count(counter: &AtomicUsize) -> usize { counter.load(Ordering::SeqCst) }
}

impl Transport for ScriptedTransport {
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn read_key(&self) -> io::Result<Key> {
        loop {
            let step = self.script.lock().unwrap().steps.pop_front();
            match step {
                Some(ScriptStep::Key(key)) => return Ok(key),
                Some(ScriptStep::Resize(width)) => self.resize(width),
                Some(ScriptStep::Pause) => {
                    let mut script = self.script.lock().unwrap();
                    script.is_paused = true;
                    self.paused_changed.notify_all();
                    while script.is_paused {
                        script = self.paused_changed.wait(script).unwrap();
                    }
                }
                None => {
                    return match self.end {
                        ScriptEnd::Eof => Ok(Key::Eof),
                        ScriptEnd::Fail(kind) => {
                            Err(io::Error::new(kind, "scripted transport failure"))
                        }
                    };
                }
            }
        }
    }

    fn enter_raw_mode(&self) -> io::Result<()> {
        self.raw_mode_entry_count.fetch_add(1, Ordering::SeqCst);
        ok!()
    }

    fn exit_raw_mode(&self) -> io::Result<()> {
        self.raw_mode_exit_count.fetch_add(1, Ordering::SeqCst);
        ok!()
    }

    fn width(&self) -> u16 { self.width.load(Ordering::SeqCst) }

    fn is_terminal(&self) -> bool { self.is_terminal.load(Ordering::SeqCst) }

    fn on_width_changed(&self, callback: WidthChangedCallback) {
        if let Ok(mut callbacks) = self.width_changed_callbacks.lock() {
            callbacks.push(callback);
        }
    }

    fn sleep_to_resume(&self) -> io::Result<()> {
        self.suspend_count.fetch_add(1, Ordering::SeqCst);
        ok!()
    }

    fn bell(&self, out: &mut dyn Write) -> io::Result<()> {
        self.bell_count.fetch_add(1, Ordering::SeqCst);
        out.write_all(b"\x07")?;
        out.flush()
    }

    fn clear_screen(&self, out: &mut dyn Write) -> io::Result<()> {
        self.clear_screen_count.fetch_add(1, Ordering::SeqCst);
        out.write_all(b"\x1b[2J\x1b[1;1H")?;
        out.flush()
    }

    fn close(&self) -> io::Result<()> {
        self.is_closed.store(true, Ordering::SeqCst);
        ok!()
    }
}
