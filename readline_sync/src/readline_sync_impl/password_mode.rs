// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Operation, ReadlineConfig, ReadlineError, ReadlineResult};
use std::sync::Arc;

/// Swaps a password config into an [`Operation`] and swaps the previous config back in
/// when dropped. The restore happens on every exit path: a submitted line, a signal, an
/// error, or a panic unwinding through the read.
#[derive(Debug)]
pub struct PasswordMode<'a> {
    operation: &'a mut Operation,
    backup: Option<Arc<ReadlineConfig>>,
}

impl<'a> PasswordMode<'a> {
    /// # Errors
    ///
    /// Returns an error if the line is on screen and redrawing it fails.
    pub fn enter(
        operation: &'a mut Operation,
        config: ReadlineConfig,
    ) -> Result<Self, ReadlineError> {
        let backup = operation.replace_config(Arc::new(config))?;
        Ok(Self {
            operation,
            backup: Some(backup),
        })
    }

    /// # Errors
    ///
    /// See [`Operation::read_runes()`].
    pub fn read(&mut self) -> Result<ReadlineResult<Vec<u8>>, ReadlineError> {
        let result = self.operation.read_runes()?;
        Ok(result.map(|line| line.into_iter().collect::<String>().into_bytes()))
    }
}

impl Drop for PasswordMode<'_> {
    fn drop(&mut self) {
        if let Some(backup) = self.backup.take()
            && let Err(err) = self.operation.replace_config(backup)
        {
            tracing::warn!(?err, "unable to restore config after password read");
        }
    }
}
