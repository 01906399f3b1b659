// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io;

/// Errors that end a read. End of input and interrupt are not errors, they are reported
/// as a [`crate::ReadlineSignal`] alongside the line.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ReadlineError {
    /// The terminal can't be read from or written to. This is fatal for the session; it
    /// should be closed.
    #[error(transparent)]
    #[diagnostic(code(r3bl_readline_sync::transport_failure))]
    IO(#[from] io::Error),

    #[error("the readline session is closed")]
    #[diagnostic(
        code(r3bl_readline_sync::closed),
        help("create a new `Readline` to keep reading input")
    )]
    Closed,

    #[error("unable to start the key dispatch thread")]
    #[diagnostic(code(r3bl_readline_sync::thread_spawn))]
    ThreadSpawn(#[source] io::Error),
}

/// How a read cycle of the dispatch loop ended, when it didn't produce a line.
#[derive(Debug)]
pub enum LoopSignal {
    EndOfInput,
    /// Carries whatever was typed before the interrupt.
    Interrupt(Vec<char>),
    TransportFailure(io::Error),
}
