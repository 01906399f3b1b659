// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};
use crate::ok;
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Install the configured layers as the global subscriber. Does nothing if the level
/// filter is [`LevelFilter::OFF`].
///
/// # Errors
///
/// Returns an error if the log file can't be created, or a global subscriber is
/// already installed.
pub fn init(tracing_config: TracingConfig) -> miette::Result<()> {
    if tracing_config.get_level_filter() == LevelFilter::OFF {
        return ok!();
    }
    let layers = try_create_layers(tracing_config)?;
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|err| miette::miette!("Can't install the tracing subscriber: {err}"))
}

impl TracingConfig {
    /// Install the configured layers for the current thread only, until the returned
    /// guard is dropped. This is great for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file can't be created.
    pub fn install_thread_local(self) -> miette::Result<dispatcher::DefaultGuard> {
        let layers = try_create_layers(self)?;
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}

/// Returns the layers. This does not install them; see [`init()`] and
/// [`TracingConfig::install_thread_local()`] for that.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<tracing_subscriber::Registry>>>> {
    let level_filter = tracing_config.get_level_filter();
    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Applies to layers that don't bring their own filter.
    return_it.push(Box::new(level_filter));

    if let Some(layer) =
        try_create_display_layer(level_filter, tracing_config.get_writer_config())?
    {
        return_it.push(layer);
    }

    if let Some(layer) =
        try_create_file_layer(level_filter, tracing_config.get_writer_config())?
    {
        return_it.push(layer);
    }

    Ok(return_it)
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Kept fallible to match [`try_create_file_layer()`]; creating a display layer doesn't
/// fail today.
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _)
        | WriterConfig::Display(display_pref) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
            DisplayPreference::SharedOutput(shared_output) => {
                // Colors would be redrawn over by the line, and raw mode has no use
                // for them either.
                let tracing_writer = move || shared_output.clone();
                Some(Box::new(
                    fmt_layer
                        .with_ansi(false)
                        .with_writer(tracing_writer)
                        .with_filter(level_filter),
                ))
            }
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    })
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    Ok(match writer_config {
        WriterConfig::DisplayAndFile(_, file_path) | WriterConfig::File(file_path) => {
            let file = rolling_file_appender_impl::try_create(&file_path)?;
            Some(Box::new(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(file)
                    .with_filter(level_filter),
            ))
        }
        WriterConfig::None | WriterConfig::Display(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineBuffer, SharedOutput, StdMutex, test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::sync::{Arc, atomic::AtomicBool};

    #[test]
    fn test_try_create_display_layer() {
        let writer_config = WriterConfig::Display(DisplayPreference::Stdout);
        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_display_layer(LevelFilter::DEBUG, writer_config).unwrap();

        assert!(layer.is_some());
    }

    #[test]
    fn test_no_layers_for_none() {
        let layers = try_create_layers(TracingConfig {
            writer_config: WriterConfig::None,
            level_filter: LevelFilter::DEBUG,
        })
        .unwrap();

        // Only the level filter.
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_try_create_both_layers() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("readline.log");
        let file_path = file_path.to_str().unwrap().to_owned();

        let tracing_config = TracingConfig::new_file_and_display(
            Some(file_path.clone()),
            DisplayPreference::Stderr,
        );

        let layers = try_create_layers(tracing_config).unwrap();
        assert_eq!(layers.len(), 3);
        assert!(std::path::Path::new(&file_path).exists());
    }

    #[test]
    #[serial]
    fn test_log_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("readline.log");

        let guard = TracingConfig::new_file(Some(file_path.to_str().unwrap().to_owned()))
            .install_thread_local()
            .unwrap();
        tracing::info!("hello from the log");
        tracing::trace!("filtered out");
        drop(guard);

        let contents = std::fs::read_to_string(&file_path).unwrap();
        assert!(contents.contains("hello from the log"));
        assert!(!contents.contains("filtered out"));
    }

    #[test]
    #[serial]
    fn test_log_to_shared_output() {
        let stdout_mock = StdoutMock::default();
        let buffer = Arc::new(StdMutex::new(LineBuffer::new(
            "> ",
            80,
            stdout_mock.clone().into_safe_raw_terminal(),
        )));
        let shared_output =
            SharedOutput::new_line_output(buffer, Arc::new(AtomicBool::new(false)));

        let guard = TracingConfig::new_display(DisplayPreference::SharedOutput(shared_output))
            .install_thread_local()
            .unwrap();
        tracing::warn!("disk almost full");
        drop(guard);

        let output = stdout_mock.get_copy_of_buffer_as_string();
        assert!(output.contains("WARN"));
        assert!(output.contains("disk almost full"));
    }
}
