// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fakes for driving a [`crate::Readline`] session without a terminal: an in memory
//! output device, and a transport that replays a script of keys.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
pub mod scripted_transport;
pub mod stdout_mock;

// Re-export.
pub use scripted_transport::*;
pub use stdout_mock::*;
