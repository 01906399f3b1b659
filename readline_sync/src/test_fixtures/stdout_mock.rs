// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{SafeRawTerminal, StdMutex};
use std::{io::{Result, Write},
          sync::Arc};
use strip_ansi_escapes::strip;

/// An output device that records everything written to it.
///
/// You can safely clone this struct, since it only contains an `Arc<StdMutex<Vec<u8>>>`.
/// Clones share the same recording.
#[derive(Clone, Default)]
pub struct StdoutMock {
    pub buffer: Arc<StdMutex<Vec<u8>>>,
}

impl std::fmt::Debug for StdoutMock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StdoutMock({:?})", self.get_copy_of_buffer_as_string())
    }
}

impl StdoutMock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Wrap a clone of this mock so it can be used as
    /// [`crate::ReadlineConfig::stdout`] or [`crate::ReadlineConfig::stderr`].
    #[must_use]
    pub fn into_safe_raw_terminal(self) -> SafeRawTerminal { Arc::new(StdMutex::new(self)) }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn clear(&self) { self.buffer.lock().unwrap().clear(); }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[must_use]
    pub fn get_copy_of_buffer(&self) -> Vec<u8> { self.buffer.lock().unwrap().clone() }

    /// Lossy, so a partially written code point doesn't panic.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[must_use]
    pub fn get_copy_of_buffer_as_string(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer_data).into_owned()
    }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[must_use]
    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        let buffer_data = strip(self.get_copy_of_buffer());
        String::from_utf8_lossy(&buffer_data).into_owned()
    }
}

impl Write for StdoutMock {
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}
