// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration store.

use clawfounder_config::{ClawfounderConfig, ConfigError, ConfigStore};
use serde_json::json;
use serial_test::serial;

fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join("knowledge_config.json"))
}

/// No override file means every value is the compiled-in default.
#[test]
#[serial]
fn missing_file_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(*store.get_config(), ClawfounderConfig::default());
}

/// A corrupt override file silently falls back to defaults.
#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "{ this is not json").unwrap();

    let config = store.get_config();
    assert_eq!(config.knowledge.retention_days, 90);
    assert_eq!(config.knowledge.snippet_length, 200);
}

/// Saved overrides are merged onto defaults and persisted as overrides only.
#[test]
fn save_config_persists_overrides_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let config = store
        .save_config(json!({"knowledge": {"retention_days": 30, "custom_topics": ["roadmap"]}}))
        .expect("valid overrides should save");
    assert_eq!(config.knowledge.retention_days, 30);
    assert_eq!(config.knowledge.custom_topics, vec!["roadmap"]);
    assert_eq!(config.knowledge.snippet_length, 200);

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        json!({"knowledge": {"retention_days": 30, "custom_topics": ["roadmap"]}})
    );
}

/// Successive saves merge with what is already on disk.
#[test]
fn save_config_merges_successive_updates() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .save_config(json!({"knowledge": {"retention_days": 30}}))
        .unwrap();
    let config = store
        .save_config(json!({"cache": {"connector_ttls": {"notion": 45}}}))
        .unwrap();

    assert_eq!(config.knowledge.retention_days, 30);
    assert_eq!(config.cache.connector_ttls.get("notion"), Some(&45));
    assert_eq!(config.cache.connector_ttls.get("telegram"), Some(&60));
}

/// An unknown key is rejected with a suggestion and nothing is written.
#[test]
fn save_config_rejects_unknown_key_with_suggestion() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let errors = store
        .save_config(json!({"knowledge": {"retention_dayz": 5}}))
        .expect_err("typo should be rejected");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("retention_days"));
    assert!(!store.path().exists());
}

/// Semantically invalid values fail validation.
#[test]
fn save_config_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let errors = store
        .save_config(json!({"knowledge": {"retention_days": 0}}))
        .expect_err("zero retention is invalid");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Non-object updates are rejected.
#[test]
fn save_config_rejects_non_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.save_config(json!(["retention_days", 5])).is_err());
}

/// Reset removes the override file and restores defaults.
#[test]
fn reset_config_restores_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .save_config(json!({"knowledge": {"snippet_length": 40}}))
        .unwrap();
    assert_eq!(store.get_config().knowledge.snippet_length, 40);

    store.reset_config().unwrap();
    assert!(!store.path().exists());
    assert_eq!(store.get_config().knowledge.snippet_length, 200);

    // Resetting twice is harmless.
    store.reset_config().unwrap();
}

/// Environment variables override file values for known sections.
#[test]
#[serial]
fn env_var_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), r#"{"storage": {"cache_dir": "/from/file"}}"#).unwrap();

    // SAFETY: tests touching the environment run serially.
    unsafe { std::env::set_var("CLAWFOUNDER_STORAGE_CACHE_DIR", "/from/env") };
    let config = store.get_config();
    unsafe { std::env::remove_var("CLAWFOUNDER_STORAGE_CACHE_DIR") };

    assert_eq!(config.storage.cache_dir, "/from/env");
}
