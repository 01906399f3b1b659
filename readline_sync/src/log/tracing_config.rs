// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::SharedOutput;
use std::fmt::Debug;
use tracing_core::LevelFilter;

pub const DEFAULT_LOG_FILE_NAME: &str = "readline_sync_log.txt";

/// Configure the tracing logging to suit your needs. You can display the logs to a:
/// 1. file,
/// 2. stdout, stderr, or a [`SharedOutput`] of a running session,
/// 3. both.
///
/// This configuration also allows you to set the log level.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

/// The `String` is the path of the log file, eg: `/tmp/readline_sync_log.txt`.
#[derive(Debug, Clone)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Clone)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
    /// Log lines are printed above the line being edited, which is then redrawn.
    SharedOutput(SharedOutput),
}

impl Debug for DisplayPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayPreference::Stdout => write!(f, "Stdout"),
            DisplayPreference::Stderr => write!(f, "Stderr"),
            DisplayPreference::SharedOutput(_) => write!(f, "SharedOutput"),
        }
    }
}

impl TracingConfig {
    /// Log to both the given [`DisplayPreference`] and a file, at `DEBUG`.
    pub fn new_file_and_display(
        filename: Option<String>,
        preferred_display: DisplayPreference,
    ) -> Self {
        Self {
            writer_config: WriterConfig::DisplayAndFile(
                preferred_display,
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_owned()),
            ),
            level_filter: LevelFilter::DEBUG,
        }
    }

    pub fn new_display(preferred_display: DisplayPreference) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level_filter: LevelFilter::DEBUG,
        }
    }

    pub fn new_file(filename: Option<String>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_owned()),
            ),
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_file_name() {
        let it = TracingConfig::new_file(None);
        assert!(
            matches!(it.get_writer_config(), WriterConfig::File(name) if name == DEFAULT_LOG_FILE_NAME)
        );
        assert_eq!(it.get_level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_with_level_filter() {
        let it = TracingConfig::new_display(DisplayPreference::Stderr)
            .with_level_filter(LevelFilter::TRACE);
        assert_eq!(it.get_level_filter(), LevelFilter::TRACE);
        assert_eq!(format!("{:?}", it.writer_config), "Display(Stderr)");
    }
}
