// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. The JSON override file (`~/.clawfounder/knowledge_config.json`)
//! 3. `CLAWFOUNDER_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};

use crate::model::{state_dir, ClawfounderConfig};

/// Config sections that environment variables may address.
const ENV_SECTIONS: &[&str] = &["storage", "knowledge", "cache"];

/// Default location of the user override file.
pub fn default_config_path() -> PathBuf {
    state_dir().join("knowledge_config.json")
}

/// Load configuration from an override file with env var overrides.
///
/// A missing file is not an error; Figment treats it as an empty layer.
pub fn load_config_from_path(path: &Path) -> Result<ClawfounderConfig, figment::Error> {
    build_figment(path).extract()
}

/// Load configuration from an inline JSON override document only (no env).
///
/// Used to validate pending overrides before they are written.
pub fn load_config_from_str(json: &str) -> Result<ClawfounderConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClawfounderConfig::default()))
        .merge(Json::string(json))
        .extract()
}

/// Build the Figment used for loading (exposed for diagnostic use).
pub fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClawfounderConfig::default()))
        .merge(Json::file(path))
        .merge(env_provider())
}

/// Environment provider mapping `CLAWFOUNDER_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `CLAWFOUNDER_STORAGE_CACHE_DIR` maps to `storage.cache_dir`.
fn env_provider() -> Env {
    Env::prefixed("CLAWFOUNDER_").map(|key| {
        let key_str = key.as_str();
        for &section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config, ClawfounderConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.knowledge.retention_days, 90);
    }

    #[test]
    fn nested_override_keeps_sibling_defaults() {
        let config =
            load_config_from_str(r#"{"knowledge": {"snippet_length": 50}}"#).unwrap();
        assert_eq!(config.knowledge.snippet_length, 50);
        assert_eq!(config.knowledge.max_topics_per_item, 5);
        assert_eq!(config.cache.default_ttl_secs, 120);
    }
}
