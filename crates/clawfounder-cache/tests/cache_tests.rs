// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the tool result and briefing caches.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clawfounder_cache::{briefing_key, BriefingCache, ToolCache};
use clawfounder_config::ClawfounderConfig;
use clawfounder_core::ManualClock;
use serde_json::json;

fn setup() -> (tempfile::TempDir, ClawfounderConfig, Arc<ManualClock>) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ClawfounderConfig::default();
    config.storage.cache_dir = dir.path().join("cache").to_string_lossy().into_owned();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
    ));
    (dir, config, clock)
}

#[tokio::test]
async fn connector_ttls_differ() {
    let (_dir, config, clock) = setup();
    let cache = ToolCache::from_config(&config, clock.clone());
    let args = json!({"chat": "team"});

    cache.put("telegram_messages", &args, "recent", None).await;
    cache.put("yahoo_quote", &args, "quote", None).await;

    clock.advance(Duration::seconds(61));
    assert_eq!(
        cache.get("telegram_messages", &args, None, Some("telegram")).await,
        None
    );
    assert_eq!(
        cache.get("yahoo_quote", &args, None, Some("yahoo_finance")).await.as_deref(),
        Some("quote")
    );
}

#[tokio::test]
async fn unknown_connector_uses_default_ttl() {
    let (_dir, config, clock) = setup();
    let cache = ToolCache::from_config(&config, clock.clone());
    let args = json!({});
    cache.put("notes_list", &args, "n", None).await;

    clock.advance(Duration::seconds(119));
    assert!(cache.get("notes_list", &args, None, Some("notes")).await.is_some());
    clock.advance(Duration::seconds(2));
    assert!(cache.get("notes_list", &args, None, None).await.is_none());
}

#[tokio::test]
async fn accounts_do_not_share_entries() {
    let (_dir, config, clock) = setup();
    let cache = ToolCache::from_config(&config, clock);
    let args = json!({"query": "x"});

    cache.put("gmail_search", &args, "work mail", Some("work")).await;
    assert_eq!(cache.get("gmail_search", &args, Some("personal"), Some("gmail")).await, None);
    assert_eq!(
        cache.get("gmail_search", &args, Some("work"), Some("gmail")).await.as_deref(),
        Some("work mail")
    );
}

#[tokio::test]
async fn unwritable_directory_is_not_an_error() {
    let (dir, mut config, clock) = setup();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();
    config.storage.cache_dir = blocker.join("cache").to_string_lossy().into_owned();
    let cache = ToolCache::from_config(&config, clock);

    cache.put("gmail_search", &json!({}), "lost", None).await;
    assert_eq!(cache.get("gmail_search", &json!({}), None, None).await, None);
}

#[tokio::test]
async fn briefing_bundle_expires() {
    let (_dir, config, clock) = setup();
    let briefings = BriefingCache::from_config(&config, clock.clone());
    let key = briefing_key(&["github", "gmail"]);
    let bundle = json!({"gmail": [{"subject": "Invoice"}], "github": []});

    assert_eq!(briefings.get(&key).await, None);
    briefings.put(&key, &bundle).await;

    clock.advance(Duration::seconds(299));
    let same_set = briefing_key(&["gmail", "github"]);
    assert_eq!(briefings.get(&same_set).await, Some(bundle));

    clock.advance(Duration::seconds(1));
    assert_eq!(briefings.get(&key).await, None);
}

#[tokio::test]
async fn clear_drops_briefings_too() {
    let (_dir, config, clock) = setup();
    let tools = ToolCache::from_config(&config, clock.clone());
    let briefings = BriefingCache::from_config(&config, clock);
    let key = briefing_key(&["gmail"]);

    tools.put("gmail_search", &json!({}), "r", None).await;
    briefings.put(&key, &json!({"gmail": []})).await;

    assert_eq!(tools.clear().await.unwrap(), 2);
    assert_eq!(briefings.get(&key).await, None);
}
