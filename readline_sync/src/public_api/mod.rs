// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
pub mod readline_config;
pub mod readline_result;
pub mod readline_sync_api;
pub mod shared_output;

// Re-export.
pub use readline_config::*;
pub use readline_result::*;
pub use readline_sync_api::*;
pub use shared_output::*;
