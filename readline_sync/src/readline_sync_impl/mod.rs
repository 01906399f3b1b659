// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The engine: the [`LineBuffer`], the [`DispatchLoop`] thread that applies keys to it,
//! and the [`Operation`] that bridges the loop to a blocking caller.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
pub mod dispatch_loop;
pub mod handoff;
pub mod line_buffer;
pub mod listener;
pub mod operation;
pub mod password_mode;
pub mod readline_error;

// Re-export.
pub use dispatch_loop::*;
pub use handoff::*;
pub use line_buffer::*;
pub use listener::*;
pub use operation::*;
pub use password_mode::*;
pub use readline_error::*;
