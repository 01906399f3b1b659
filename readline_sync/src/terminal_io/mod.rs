// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Everything on the terminal side of the line editor: decoded [`Key`]s, the
//! [`Transport`] trait, its default `crossterm` implementation, and the [`Terminal`]
//! wrapper that applies configuration overrides.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
pub mod crossterm_transport;
pub mod key;
pub mod terminal;
pub mod transport;

// Re-export.
pub use crossterm_transport::*;
pub use key::*;
pub use terminal::*;
pub use transport::*;
