// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ClawFounder knowledge subsystem.

use thiserror::Error;

/// The primary error type shared by the knowledge store, caches and config store.
///
/// Public knowledge-base entry points absorb these internally and degrade to
/// empty results; only `open` surfaces them to the caller.
#[derive(Debug, Error)]
pub enum ClawfounderError {
    /// Configuration errors (unreadable file, invalid override values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, lock failure, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File cache errors (directory creation, write failure).
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A tool was invoked with input it cannot accept.
    #[error("invalid tool input: {0}")]
    InvalidInput(String),
}

impl ClawfounderError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClawfounderError::Storage {
            source: Box::new(err),
        }
    }

    /// Wrap an I/O failure on a cache file.
    pub fn cache(message: impl Into<String>, err: std::io::Error) -> Self {
        ClawfounderError::Cache {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }
}
