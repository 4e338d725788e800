// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL cache for connector tool results, shared by every agent process
//! through the cache directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clawfounder_config::{CacheConfig, ClawfounderConfig};
use clawfounder_core::{ClawfounderError, Clock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entry::{read_fresh, write_entry, Timestamped};
use crate::key::cache_key;
use crate::metrics::record_lookup;

#[derive(Debug, Serialize, Deserialize)]
struct ToolEntry {
    ts: f64,
    tool: String,
    result: String,
}

impl Timestamped for ToolEntry {
    fn ts(&self) -> f64 {
        self.ts
    }
}

/// File cache of raw tool results keyed by tool, arguments and account.
#[derive(Debug)]
pub struct ToolCache {
    dir: PathBuf,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl ToolCache {
    pub fn new(dir: impl Into<PathBuf>, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            config,
            clock,
        }
    }

    /// Cache in `storage.cache_dir` with the configured TTLs.
    pub fn from_config(config: &ClawfounderConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(&config.storage.cache_dir, config.cache.clone(), clock)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached result of `tool(args)` if it is still fresh for `connector`.
    pub async fn get(
        &self,
        tool: &str,
        args: &Value,
        account: Option<&str>,
        connector: Option<&str>,
    ) -> Option<String> {
        let path = self.entry_path(tool, args, account);
        let ttl = self.config.ttl_for(connector);
        let lookup = read_fresh::<ToolEntry>(&path, self.clock.epoch_secs(), ttl).await;
        record_lookup("tool", lookup.label());
        debug!(tool, result = lookup.label(), "tool cache lookup");
        lookup.into_fresh().map(|entry| entry.result)
    }

    /// Store a tool result. Failures are logged, never returned.
    pub async fn put(&self, tool: &str, args: &Value, result: &str, account: Option<&str>) {
        let path = self.entry_path(tool, args, account);
        let entry = ToolEntry {
            ts: self.clock.epoch_secs(),
            tool: tool.to_string(),
            result: result.to_string(),
        };
        if let Err(e) = write_entry(&path, &entry).await {
            warn!(tool, error = %e, "tool cache write failed");
        }
    }

    /// Remove every file in the cache directory, briefing bundles included.
    ///
    /// Returns the number of files removed.
    pub async fn clear(&self) -> Result<usize, ClawfounderError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(ClawfounderError::cache(
                    format!("failed to list {}", self.dir.display()),
                    e,
                ));
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ClawfounderError::cache("failed to list cache directory", e))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = %path.display(), error = %e, "failed to remove cache file"),
            }
        }
        debug!(removed, "tool cache cleared");
        Ok(removed)
    }

    fn entry_path(&self, tool: &str, args: &Value, account: Option<&str>) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(tool, args, account)))
    }
}
