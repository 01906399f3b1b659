// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{LineBuffer, SafeLineBuffer, SafeRawTerminal};
use std::{io::{self, Write},
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}}};

#[derive(Clone)]
enum OutputTarget {
    /// Whatever the line itself is drawn to. Follows config replacement.
    LineOutput,
    Other(SafeRawTerminal),
}

/// A cloneable [`Write`] implementation for printing while a line is being edited.
///
/// While a read is in progress each write erases the line, writes the bytes, and draws
/// the line again underneath, all under the buffer lock. Between reads the bytes go
/// straight to the device. Lone `\n` bytes are written as `\r\n` during a read, since
/// the terminal is in raw mode then.
///
/// You can hand this to a logger (see [`crate::DisplayPreference::SharedOutput`]). Don't
/// log from code that holds the buffer lock, it is not reentrant.
///
/// # Panics
///
/// [`Write::write()`] will panic if a lock is poisoned.
#[derive(Clone)]
pub struct SharedOutput {
    target: OutputTarget,
    buffer: SafeLineBuffer,
    is_reading: Arc<AtomicBool>,
}

impl std::fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOutput")
            .field("is_line_output", &matches!(self.target, OutputTarget::LineOutput))
            .field("is_reading", &self.is_reading)
            .finish_non_exhaustive()
    }
}

impl SharedOutput {
    /// Write to `target`.
    pub fn new(
        target: SafeRawTerminal,
        buffer: SafeLineBuffer,
        is_reading: Arc<AtomicBool>,
    ) -> Self {
        Self {
            target: OutputTarget::Other(target),
            buffer,
            is_reading,
        }
    }

    /// Write to the device the line is drawn to.
    pub fn new_line_output(buffer: SafeLineBuffer, is_reading: Arc<AtomicBool>) -> Self {
        Self {
            target: OutputTarget::LineOutput,
            buffer,
            is_reading,
        }
    }

    fn target_for(&self, buffer: &LineBuffer) -> SafeRawTerminal {
        match &self.target {
            OutputTarget::LineOutput => buffer.output(),
            OutputTarget::Other(it) => it.clone(),
        }
    }
}

impl Write for SharedOutput {
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap();

        if !self.is_reading.load(Ordering::SeqCst) {
            let target = self.target_for(&buffer);
            drop(buffer);
            let mut term = target.lock().unwrap();
            term.write_all(buf)?;
            term.flush()?;
            return Ok(buf.len());
        }

        let bytes = with_carriage_returns(buf);
        buffer.refresh_with(|it| -> io::Result<()> {
            let target = self.target_for(it);
            let mut term = target.lock().unwrap();
            term.write_all(&bytes)?;
            term.flush()
        })??;

        Ok(buf.len())
    }

    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    fn flush(&mut self) -> io::Result<()> {
        let target = self.target_for(&self.buffer.lock().unwrap());
        target.lock().unwrap().flush()
    }
}

fn with_carriage_returns(buf: &[u8]) -> Vec<u8> {
    let mut acc = Vec::with_capacity(buf.len());
    let mut prev = None;
    for &byte in buf {
        if byte == b'\n' && prev != Some(b'\r') {
            acc.push(b'\r');
        }
        acc.push(byte);
        prev = Some(byte);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StdMutex, test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;

    fn fixture(content: &str) -> (SafeLineBuffer, StdoutMock, Arc<AtomicBool>) {
        let stdout_mock = StdoutMock::default();
        let mut line_buffer =
            LineBuffer::new("> ", 80, stdout_mock.clone().into_safe_raw_terminal());
        line_buffer.set_with_idx(content.chars().count(), content.chars().collect()).unwrap();
        stdout_mock.clear();
        (
            Arc::new(StdMutex::new(line_buffer)),
            stdout_mock,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_write_between_reads_goes_straight_through() {
        let (buffer, stdout_mock, is_reading) = fixture("");
        let mut it = SharedOutput::new_line_output(buffer, is_reading);

        it.write_all(b"log line\n").unwrap();

        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "log line\n");
    }

    #[test]
    fn test_write_during_read_redraws_line_below() {
        let (buffer, stdout_mock, is_reading) = fixture("abc");
        is_reading.store(true, Ordering::SeqCst);
        let mut it = SharedOutput::new_line_output(buffer.clone(), is_reading);

        it.write_all(b"log line\n").unwrap();

        assert_eq!(
            stdout_mock.get_copy_of_buffer_as_string(),
            "\x1b[1G\x1b[Jlog line\r\n> abc"
        );
        assert_eq!(buffer.lock().unwrap().line(), "abc");
    }

    #[test]
    fn test_write_to_other_target_during_read() {
        let (buffer, stdout_mock, is_reading) = fixture("abc");
        is_reading.store(true, Ordering::SeqCst);
        let stderr_mock = StdoutMock::default();
        let mut it =
            SharedOutput::new(stderr_mock.clone().into_safe_raw_terminal(), buffer, is_reading);

        it.write_all(b"oops\r\n").unwrap();

        assert_eq!(stderr_mock.get_copy_of_buffer_as_string(), "oops\r\n");
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "\x1b[1G\x1b[J> abc");
    }

    #[test]
    fn test_with_carriage_returns() {
        assert_eq!(with_carriage_returns(b"a\nb\r\nc"), b"a\r\nb\r\nc".to_vec());
    }
}
