// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Optional `tracing` setup for applications built on this crate. The crate itself only
//! emits events; nothing is recorded until a subscriber is installed, for example with
//! [`init()`] or [`TracingConfig::install_thread_local()`].

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
