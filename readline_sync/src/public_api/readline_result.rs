// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Why a read ended without a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ReadlineSignal {
    /// <kbd>Ctrl+D</kbd> on an empty line, or the input stream ended.
    EndOfInput,
    /// <kbd>Ctrl+C</kbd>. The line that was being edited is returned with it.
    Interrupt,
}

/// What a read produced: the text, and the signal that ended the read if it wasn't a
/// plain submit. `T` is [`String`] for lines and `Vec<u8>` for passwords.
///
/// In a REPL you typically want to keep going after <kbd>Ctrl+C</kbd> clears a half
/// typed line, and stop on anything else:
///
/// ```no_run
/// # use r3bl_readline_sync::{Readline, ReadlineError};
/// # fn main() -> Result<(), ReadlineError> {
/// let mut readline = Readline::try_new("> ")?;
/// loop {
///     let result = readline.read_line()?;
///     if result.can_continue() {
///         continue;
///     }
///     if result.can_break() {
///         break;
///     }
///     println!("{}", result.line);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadlineResult<T> {
    pub line: T,
    pub signal: Option<ReadlineSignal>,
}

impl<T> ReadlineResult<T> {
    pub fn new(line: T, signal: Option<ReadlineSignal>) -> Self { Self { line, signal } }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadlineResult<U> {
        ReadlineResult {
            line: f(self.line),
            signal: self.signal,
        }
    }
}

impl<T: AsRef<[u8]>> ReadlineResult<T> {
    /// An interrupted, non empty line. That only clears the line, it is not a reason to
    /// stop reading.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        !self.line.as_ref().is_empty() && self.signal == Some(ReadlineSignal::Interrupt)
    }

    /// Any other signal. Time to stop reading.
    #[must_use]
    pub fn can_break(&self) -> bool { !self.can_continue() && self.signal.is_some() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("hello", Some(ReadlineSignal::Interrupt), true, false ; "interrupt with text")]
    #[test_case("", Some(ReadlineSignal::Interrupt), false, true ; "interrupt on empty line")]
    #[test_case("", Some(ReadlineSignal::EndOfInput), false, true ; "end of input")]
    #[test_case("hello", None, false, false ; "submitted line")]
    #[test_case("", None, false, false ; "submitted empty line")]
    fn test_policy(line: &str, signal: Option<ReadlineSignal>, can_continue: bool, can_break: bool) {
        let it = ReadlineResult::new(line.to_owned(), signal);
        assert_eq!(it.can_continue(), can_continue);
        assert_eq!(it.can_break(), can_break);

        let it = it.map(String::into_bytes);
        assert_eq!(it.can_continue(), can_continue);
        assert_eq!(it.can_break(), can_break);
    }
}
