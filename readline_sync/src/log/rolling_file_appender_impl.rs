// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

/// A log file that is never rotated.
///
/// Note that if you wrap this up in a non blocking writer, events logged right before
/// the process exits can be lost.
///
/// # Errors
///
/// Returns an error if:
/// - The path has no parent directory
/// - The path has no file name
/// - Insufficient permissions to create the file
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = PathBuf::from(&path_str);

    let parent = path.parent().ok_or_else(|| {
        miette::miette!(
            "Can't access the folder of {}. It might not exist, or you don't have the \
             required permissions.",
            path.display()
        )
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("{} doesn't name a file.", path.display())
    })?;

    tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(parent)
        .map_err(|err| miette::miette!("Can't create log file {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_create() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("readline.log");

        let it = try_create(file_path.to_str().unwrap());

        assert!(it.is_ok());
        assert!(file_path.exists());
    }

    #[test]
    fn test_try_create_without_file_name() {
        assert!(try_create("/").is_err());
    }
}
