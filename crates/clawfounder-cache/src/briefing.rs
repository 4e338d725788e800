// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache of gathered briefing bundles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clawfounder_config::ClawfounderConfig;
use clawfounder_core::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entry::{read_fresh, write_entry, Timestamped};
use crate::metrics::record_lookup;

#[derive(Debug, Serialize, Deserialize)]
struct BriefingEntry {
    ts: f64,
    gathered: Value,
}

impl Timestamped for BriefingEntry {
    fn ts(&self) -> f64 {
        self.ts
    }
}

/// Per-connector-set briefing data, reused for `briefing_ttl_secs`.
///
/// Keys come from [`briefing_key`](crate::briefing_key).
#[derive(Debug)]
pub struct BriefingCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl BriefingCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
        }
    }

    pub fn from_config(config: &ClawfounderConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(&config.storage.cache_dir, config.cache.briefing_ttl(), clock)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let lookup = read_fresh::<BriefingEntry>(&self.path(key), self.clock.epoch_secs(), self.ttl).await;
        record_lookup("briefing", lookup.label());
        debug!(key, result = lookup.label(), "briefing cache lookup");
        lookup.into_fresh().map(|entry| entry.gathered)
    }

    /// Store a gathered bundle. Failures are logged, never returned.
    pub async fn put(&self, key: &str, bundle: &Value) {
        let entry = BriefingEntry {
            ts: self.clock.epoch_secs(),
            gathered: bundle.clone(),
        };
        if let Err(e) = write_entry(&self.path(key), &entry).await {
            warn!(key, error = %e, "briefing cache write failed");
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("briefing_{key}.json"))
    }
}
