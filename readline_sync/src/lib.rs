// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words readline

//! # `r3bl_readline_sync`
//!
//! A synchronous, interactive line editor for terminal programs. You call
//! [`Readline::read_line()`] and it blocks until the user submits a line, interrupts
//! it, or signals the end of input. While the user is typing, other threads can keep
//! writing to the terminal through a [`SharedOutput`] without clobbering the line that
//! is being edited.
//!
//! # Table of contents
//!
//! <!-- TOC -->
//!
//! - [Mental model](#mental-model)
//! - [Key bindings](#key-bindings)
//! - [Password input](#password-input)
//! - [Concurrent output](#concurrent-output)
//! - [Testing](#testing)
//!
//! <!-- /TOC -->
//!
//! # Mental model
//!
//! ```text
//! ┌──────────────┐ kick ┌───────────────┐ read_key ┌────────────────────────┐
//! │ read_line()  ├─────►│ dispatch loop ├─────────►│ Transport (crossterm)  │
//! │ (caller)     │      │ (one thread)  │          └────────────────────────┘
//! │              │◄─────┤               ├─────────►┌────────────────────────┐
//! └──────────────┘ line │               │  mutate  │ LineBuffer (rendering) │
//!                  or   └───────────────┘          └────────────────────────┘
//!                  signal
//! ```
//!
//! 1. There is exactly one background thread per [`Readline`]: the dispatch loop. It
//!    blocks on a single key read, decodes it into a [`Key`], and applies the matching
//!    [`LineBuffer`] operation.
//! 2. [`Readline::read_line()`] enters raw mode, renders the prompt, wakes the loop, and
//!    then waits on two single-slot handoffs: one for completed lines and one for
//!    signals ([`ReadlineSignal::EndOfInput`], [`ReadlineSignal::Interrupt`]) and
//!    transport failures. Raw mode is always exited when it returns.
//! 3. Once a line is emitted the loop parks itself until the next call to
//!    [`Readline::read_line()`]. Keys typed in between stay in the terminal's input
//!    queue.
//!
//! # Key bindings
//!
//! | Input                      | Action                                         |
//! |----------------------------|------------------------------------------------|
//! | Ctrl+A / Home              | Move to line start                             |
//! | Ctrl+B / Left              | Move backward one code point                   |
//! | Meta+B                     | Move backward one word                         |
//! | Ctrl+C                     | Interrupt, returning the partial line          |
//! | Ctrl+D / Delete            | Delete forward, or end of input when empty     |
//! | Meta+D                     | Delete word forward                            |
//! | Ctrl+E / End               | Move to line end                               |
//! | Ctrl+F / Right             | Move forward one code point                    |
//! | Meta+F                     | Move forward one word                          |
//! | Ctrl+G                     | Cancel (bell)                                  |
//! | Ctrl+H / Backspace         | Delete previous code point                     |
//! | Tab                        | Completion (bell)                              |
//! | Ctrl+J / Enter             | Submit line                                    |
//! | Ctrl+K                     | Cut to end of line                             |
//! | Ctrl+L                     | Clear screen and redraw                        |
//! | Ctrl+N / Down, Ctrl+P / Up | History, via [`HistoryNavigator`]              |
//! | Ctrl+R / Ctrl+S            | History search (bell)                          |
//! | Ctrl+T                     | Transpose adjacent code points                 |
//! | Meta+T                     | Transpose words (bell)                         |
//! | Ctrl+U                     | Cut to line start                              |
//! | Ctrl+W / Meta+Backspace    | Cut previous word                              |
//! | Ctrl+Z                     | Suspend, then redraw on resume                 |
//!
//! # Password input
//!
//! [`Readline::read_password()`] swaps in a masked configuration for the duration of a
//! single read and restores the previous one on every exit path.
//!
//! # Concurrent output
//!
//! [`Readline::stdout()`] and [`Readline::stderr()`] hand out a [`SharedOutput`]. When a
//! read is in progress each write is sandwiched: the edited line is erased, the bytes
//! are written, and the line is drawn again.
//!
//! # Testing
//!
//! The [`test_fixtures`] module contains a [`StdoutMock`] output device and a
//! [`ScriptedTransport`] that replays a fixed list of keys, so that a whole session can
//! be driven without a real terminal.
//!
//! [`LineBuffer`]: crate::LineBuffer
//! [`StdoutMock`]: crate::test_fixtures::StdoutMock
//! [`ScriptedTransport`]: crate::test_fixtures::ScriptedTransport

// https://github.com/rust-lang/rust-clippy
// https://rust-lang.github.io/rust-clippy/master/index.html
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
// Only deny unwrap_in_result in non-test code.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod log;
pub mod public_api;
pub mod readline_sync_impl;
pub mod terminal_io;
pub mod test_fixtures;

// Re-export.
pub use log::*;
pub use public_api::*;
pub use readline_sync_impl::*;
pub use terminal_io::*;

// External crates.
use std::{io::Write, sync::Arc};

// Type aliases.
pub type StdMutex<T> = std::sync::Mutex<T>;

pub type SendRawTerminal = dyn Write + Send;
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

pub type SafeLineBuffer = Arc<StdMutex<LineBuffer>>;

/// Wrap the given expression in an `Ok`, or return `Ok(())` when no expression is
/// given.
#[macro_export]
macro_rules! ok {
    () => {
        Ok(())
    };
    ($value:expr) => {
        Ok($value)
    };
}
