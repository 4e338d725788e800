// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamped JSON cache files.
//!
//! Files are written without locking. A torn or foreign file fails to parse
//! and is treated like any other corrupt entry: removed, then reported as a
//! miss.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use clawfounder_core::ClawfounderError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Outcome of reading one cache file.
#[derive(Debug)]
pub(crate) enum Lookup<T> {
    Fresh(T),
    Missing,
    Expired,
    Corrupt,
}

impl<T> Lookup<T> {
    /// Metric label for this outcome.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Lookup::Fresh(_) => "hit",
            Lookup::Missing => "miss",
            Lookup::Expired => "expired",
            Lookup::Corrupt => "corrupt",
        }
    }

    pub(crate) fn into_fresh(self) -> Option<T> {
        match self {
            Lookup::Fresh(value) => Some(value),
            _ => None,
        }
    }
}

/// Anything stored with a write timestamp in epoch seconds.
pub(crate) trait Timestamped {
    fn ts(&self) -> f64;
}

/// Read `path` and return its entry if it is younger than `ttl` at `now`.
///
/// Expired and unparseable files are deleted.
pub(crate) async fn read_fresh<T>(path: &Path, now: f64, ttl: Duration) -> Lookup<T>
where
    T: DeserializeOwned + Timestamped,
{
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Lookup::Missing,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cache read failed");
            return Lookup::Missing;
        }
    };

    let entry: T = match serde_json::from_str(&raw) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "removing corrupt cache entry");
            remove_quietly(path).await;
            return Lookup::Corrupt;
        }
    };

    if now - entry.ts() < ttl.as_secs_f64() {
        Lookup::Fresh(entry)
    } else {
        remove_quietly(path).await;
        Lookup::Expired
    }
}

/// Serialize `entry` to `path`, creating the cache directory if needed.
pub(crate) async fn write_entry<T: Serialize>(path: &Path, entry: &T) -> Result<(), ClawfounderError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ClawfounderError::cache(format!("failed to create {}", dir.display()), e))?;
    }
    let body = serde_json::to_vec(entry)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| ClawfounderError::cache(format!("failed to write {}", path.display()), e))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "failed to remove cache entry");
        }
    }
}
