// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached, writable view of the user override file.
//!
//! Each agent process owns one [`ConfigStore`]. Reads are served from an
//! in-memory snapshot that is rebuilt lazily after every write or reset made
//! through this store. Writes made by another process become visible after
//! [`ConfigStore::invalidate`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::diagnostic::{figment_to_config_errors, ConfigError};
use crate::loader::{default_config_path, load_config_from_path, load_config_from_str};
use crate::model::ClawfounderConfig;
use crate::validation::validate_config;

/// Override-file backed configuration store with an in-memory snapshot.
pub struct ConfigStore {
    path: PathBuf,
    cached: ArcSwapOption<ClawfounderConfig>,
}

impl ConfigStore {
    /// Create a store backed by the override file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: ArcSwapOption::empty(),
        }
    }

    /// Create a store backed by `~/.clawfounder/knowledge_config.json`.
    pub fn at_default_path() -> Self {
        Self::new(default_config_path())
    }

    /// Location of the override file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective configuration: defaults merged with the user overrides.
    ///
    /// Never fails. A corrupt or invalid override file yields the compiled-in
    /// defaults and a warning.
    pub fn get_config(&self) -> Arc<ClawfounderConfig> {
        if let Some(config) = self.cached.load_full() {
            return config;
        }

        let config = match load_config_from_path(&self.path) {
            Ok(config) => match validate_config(&config) {
                Ok(()) => config,
                Err(errors) => {
                    warn!(
                        path = %self.path.display(),
                        errors = errors.len(),
                        "config overrides failed validation, using defaults"
                    );
                    ClawfounderConfig::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config overrides unreadable, using defaults");
                ClawfounderConfig::default()
            }
        };

        let config = Arc::new(config);
        self.cached.store(Some(Arc::clone(&config)));
        config
    }

    /// The raw override document currently on disk (an empty object when the
    /// file is missing or corrupt).
    pub fn overrides(&self) -> Value {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Value::Object(Map::new());
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                debug!(path = %self.path.display(), "ignoring non-object config overrides");
                Value::Object(Map::new())
            }
        }
    }

    /// Merge `updates` into the override file and return the new effective config.
    ///
    /// `updates` must be a JSON object shaped like the config (nested objects are
    /// merged key by key). Nothing is written unless the merged result is valid.
    pub fn save_config(&self, updates: Value) -> Result<Arc<ClawfounderConfig>, Vec<ConfigError>> {
        let Value::Object(_) = updates else {
            return Err(vec![ConfigError::Other(
                "config updates must be a JSON object".to_string(),
            )]);
        };

        let mut merged = self.overrides();
        deep_merge(&mut merged, updates);

        let document = serde_json::to_string_pretty(&merged)
            .map_err(|e| vec![ConfigError::Other(e.to_string())])?;
        let candidate = load_config_from_str(&document).map_err(figment_to_config_errors)?;
        validate_config(&candidate)?;

        self.write_overrides(&document).map_err(|e| vec![e])?;
        self.invalidate();
        debug!(path = %self.path.display(), "config overrides saved");
        Ok(self.get_config())
    }

    /// Remove all user overrides, restoring the compiled-in defaults.
    pub fn reset_config(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Drop the in-memory snapshot so the next read reloads from disk.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    fn write_overrides(&self, document: &str) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&self.path, document).map_err(io_err)
    }
}

/// Recursively merge `updates` into `base`; non-object values replace.
fn deep_merge(base: &mut Value, updates: Value) {
    match (base, updates) {
        (Value::Object(base_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, updates) => *base = updates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_keeps_siblings() {
        let mut base = json!({"knowledge": {"retention_days": 30, "snippet_length": 50}});
        deep_merge(&mut base, json!({"knowledge": {"retention_days": 7}}));
        assert_eq!(base, json!({"knowledge": {"retention_days": 7, "snippet_length": 50}}));
    }

    #[test]
    fn deep_merge_replaces_arrays() {
        let mut base = json!({"knowledge": {"custom_topics": ["a"]}});
        deep_merge(&mut base, json!({"knowledge": {"custom_topics": ["b", "c"]}}));
        assert_eq!(base["knowledge"]["custom_topics"], json!(["b", "c"]));
    }

    #[test]
    fn snapshot_is_reused_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let store = ConfigStore::new(&path);

        let first = store.get_config();
        std::fs::write(&path, r#"{"knowledge": {"retention_days": 3}}"#).unwrap();
        let second = store.get_config();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.knowledge.retention_days, 90);

        store.invalidate();
        assert_eq!(store.get_config().knowledge.retention_days, 3);
    }
}
