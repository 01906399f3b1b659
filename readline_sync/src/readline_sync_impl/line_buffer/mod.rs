// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The editable line and its rendering.
//!
//! | Module    | Responsibility                                               |
//! |-----------|--------------------------------------------------------------|
//! | `core`    | [`LineBuffer`] struct, accessors, display width calculations |
//! | `editing` | Code point and word level edits, cursor movement             |
//! | `render`  | Erase and redraw with wrapping, masked rendering             |

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
mod core;
mod editing;
mod render;

// Re-export.
pub use self::core::*;
