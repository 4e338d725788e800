// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the knowledge subsystem.
//!
//! The on-disk config file only carries user overrides; every field here has a
//! compiled-in default. All structs use `#[serde(deny_unknown_fields)]` so a
//! typo in an override is rejected instead of silently ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClawfounderConfig {
    /// On-disk locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Knowledge store extraction and retrieval settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Tool result and briefing cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// File locations shared by every agent process.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite knowledge database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory holding cached tool results and briefing bundles.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            cache_dir: default_cache_dir(),
        }
    }
}

/// Base directory for all persisted state (`~/.clawfounder`).
pub fn state_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".clawfounder"))
        .unwrap_or_else(|| std::path::PathBuf::from(".clawfounder"))
}

fn default_database_path() -> String {
    state_dir().join("knowledge.db").to_string_lossy().into_owned()
}

fn default_cache_dir() -> String {
    state_dir().join("cache").to_string_lossy().into_owned()
}

/// Knowledge store configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Items indexed longer ago than this are swept at open.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Maximum characters of body text kept per item.
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Maximum topic entities attached to one item.
    #[serde(default = "default_max_topics_per_item")]
    pub max_topics_per_item: usize,

    /// Built-in topic vocabulary. Overriding replaces the whole list.
    #[serde(default = "default_topic_keywords")]
    pub topic_keywords: Vec<String>,

    /// User-defined topics added on top of `topic_keywords`.
    #[serde(default)]
    pub custom_topics: Vec<String>,

    /// Result cap for `search` when the caller gives none.
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Maximum candidate entities pulled out of one chat message.
    #[serde(default = "default_quick_search_max_entities")]
    pub quick_search_max_entities: usize,

    /// Maximum hits rendered into a quick-search context block.
    #[serde(default = "default_quick_search_max_results")]
    pub quick_search_max_results: usize,

    /// Title truncation in quick-search lines.
    #[serde(default = "default_quick_title_length")]
    pub quick_title_length: usize,

    /// Snippet truncation in quick-search lines.
    #[serde(default = "default_quick_snippet_length")]
    pub quick_snippet_length: usize,

    /// Capitalized words never treated as entity candidates.
    #[serde(default = "default_common_words")]
    pub common_words: Vec<String>,

    /// How long a computed summary is reused.
    #[serde(default = "default_summary_ttl_secs")]
    pub summary_ttl_secs: u64,

    /// Entries listed per summary line.
    #[serde(default = "default_summary_top_n")]
    pub summary_top_n: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            snippet_length: default_snippet_length(),
            max_topics_per_item: default_max_topics_per_item(),
            topic_keywords: default_topic_keywords(),
            custom_topics: Vec::new(),
            default_max_results: default_max_results(),
            quick_search_max_entities: default_quick_search_max_entities(),
            quick_search_max_results: default_quick_search_max_results(),
            quick_title_length: default_quick_title_length(),
            quick_snippet_length: default_quick_snippet_length(),
            common_words: default_common_words(),
            summary_ttl_secs: default_summary_ttl_secs(),
            summary_top_n: default_summary_top_n(),
        }
    }
}

impl KnowledgeConfig {
    /// Lower-cased union of the base vocabulary and custom topics, sorted.
    pub fn topic_vocabulary(&self) -> BTreeSet<String> {
        self.topic_keywords
            .iter()
            .chain(self.custom_topics.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Lower-cased stoplist for quick-search candidate extraction.
    pub fn common_word_set(&self) -> BTreeSet<String> {
        self.common_words.iter().map(|w| w.to_lowercase()).collect()
    }

    /// Summary cache lifetime.
    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_ttl_secs)
    }
}

fn default_retention_days() -> u32 {
    90
}

fn default_snippet_length() -> usize {
    200
}

fn default_max_topics_per_item() -> usize {
    5
}

fn default_topic_keywords() -> Vec<String> {
    [
        "firebase", "supabase", "api key", "api keys", "deployment", "deploy",
        "production", "staging", "database", "auth", "authentication",
        "payment", "invoice", "contract", "deadline", "meeting", "review",
        "merge", "release", "bug", "fix", "feature", "sprint", "standup",
        "credentials", "password", "token", "secret", "config", "migration",
        "docker", "kubernetes", "ci/cd", "pipeline", "terraform",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_results() -> usize {
    10
}

fn default_quick_search_max_entities() -> usize {
    8
}

fn default_quick_search_max_results() -> usize {
    5
}

fn default_quick_title_length() -> usize {
    80
}

fn default_quick_snippet_length() -> usize {
    120
}

fn default_common_words() -> Vec<String> {
    [
        "I", "The", "A", "An", "And", "Or", "But", "If", "Then", "So", "Is",
        "Are", "Was", "Were", "Be", "Do", "Does", "Did", "Can", "Could",
        "Would", "Should", "Will", "What", "When", "Where", "Who", "Why",
        "How", "Which", "This", "That", "These", "Those", "There", "Here",
        "Please", "Thanks", "Thank", "Hi", "Hello", "Hey", "Yes", "No", "Ok",
        "Okay", "Any", "Some", "All", "My", "Me", "You", "Your", "We", "Our",
        "They", "Their", "It", "Its", "Let", "Also", "Just", "Today",
        "Tomorrow", "Yesterday", "Monday", "Tuesday", "Wednesday", "Thursday",
        "Friday", "Saturday", "Sunday", "Update", "Check", "Show", "Tell",
        "Find", "Get", "Send",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_summary_ttl_secs() -> u64 {
    300
}

fn default_summary_top_n() -> usize {
    5
}

/// Tool result and briefing cache configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// TTL for connectors without an entry in `connector_ttls`.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Per-connector TTLs in seconds.
    #[serde(default = "default_connector_ttls")]
    pub connector_ttls: BTreeMap<String, u64>,

    /// TTL of a gathered briefing bundle.
    #[serde(default = "default_briefing_ttl_secs")]
    pub briefing_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            connector_ttls: default_connector_ttls(),
            briefing_ttl_secs: default_briefing_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// TTL applied to a cached result from `connector`.
    pub fn ttl_for(&self, connector: Option<&str>) -> Duration {
        let secs = connector
            .and_then(|c| self.connector_ttls.get(c))
            .copied()
            .unwrap_or(self.default_ttl_secs);
        Duration::from_secs(secs)
    }

    /// TTL applied to briefing bundles.
    pub fn briefing_ttl(&self) -> Duration {
        Duration::from_secs(self.briefing_ttl_secs)
    }
}

fn default_ttl_secs() -> u64 {
    120
}

fn default_connector_ttls() -> BTreeMap<String, u64> {
    [
        ("gmail", 120),
        ("work_email", 120),
        ("github", 180),
        ("telegram", 60),
        ("whatsapp", 60),
        ("yahoo_finance", 300),
        ("firebase", 180),
        ("supabase", 180),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_briefing_ttl_secs() -> u64 {
    300
}
