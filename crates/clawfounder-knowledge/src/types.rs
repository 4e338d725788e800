// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for the knowledge store.

use serde::{Deserialize, Serialize};

/// What an entity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Repo,
    Topic,
    Ticker,
}

impl EntityKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Repo => "repo",
            EntityKind::Topic => "topic",
            EntityKind::Ticker => "ticker",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "person" => Some(EntityKind::Person),
            "repo" => Some(EntityKind::Repo),
            "topic" => Some(EntityKind::Topic),
            "ticker" => Some(EntityKind::Ticker),
            _ => None,
        }
    }
}

/// How an item mentions an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Sender,
    Recipient,
    Author,
    Assignee,
    Mentioned,
}

impl EntityRole {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::Sender => "sender",
            EntityRole::Recipient => "recipient",
            EntityRole::Author => "author",
            EntityRole::Assignee => "assignee",
            EntityRole::Mentioned => "mentioned",
        }
    }
}

/// A candidate entity attached to an extracted item, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub kind: EntityKind,
    /// Display value as it appeared in the source.
    pub value: String,
    pub role: EntityRole,
}

impl EntityMention {
    pub fn new(kind: EntityKind, value: impl Into<String>, role: EntityRole) -> Self {
        Self {
            kind,
            value: value.into(),
            role,
        }
    }
}

/// One record produced by an extractor from a tool result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    /// Connector-defined natural key (message id, PR number, row id).
    pub source_id: String,
    /// Normalized timestamp of the underlying event, if known.
    pub event_date: Option<String>,
    pub title: String,
    /// Body preview, already truncated to the configured length.
    pub snippet: String,
    /// Connector-specific fields kept alongside the item.
    pub metadata: serde_json::Value,
    pub entities: Vec<EntityMention>,
}

impl ExtractedItem {
    /// Space-joined display values of all non-blank mentions.
    ///
    /// This is exactly the `entity_text` written to both the item row and the
    /// full-text projection, so a later delete can replay it verbatim.
    pub fn entity_text(&self) -> String {
        self.entities
            .iter()
            .map(|m| m.value.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A stored knowledge item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeItem {
    pub id: i64,
    pub connector: String,
    pub tool_name: String,
    pub source_id: String,
    pub account_id: Option<String>,
    pub event_date: Option<String>,
    pub indexed_at: String,
    pub title: String,
    pub snippet: String,
    pub metadata: serde_json::Value,
}

/// A stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: i64,
    pub kind: EntityKind,
    pub value: String,
    pub normalized: String,
}

/// One search result as handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(skip)]
    pub id: i64,
    pub connector: String,
    pub tool: String,
    pub source_id: String,
    /// Event date, empty when unknown.
    pub date: String,
    pub title: String,
    pub snippet: String,
    pub metadata: serde_json::Value,
    /// Account id, empty for single-account connectors.
    pub account: String,
}

/// Result of `search`: either hits with a count or an explicit no-results message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Found {
        results: Vec<SearchHit>,
        count: usize,
    },
    NoResults {
        results: Vec<SearchHit>,
        message: String,
    },
}

impl SearchResponse {
    /// Wrap merged hits, choosing the no-results shape when empty.
    pub fn from_hits(query: &str, hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            Self::no_results(query)
        } else {
            let count = hits.len();
            SearchResponse::Found {
                results: hits,
                count,
            }
        }
    }

    /// The explicit "nothing known" response.
    pub fn no_results(query: &str) -> Self {
        SearchResponse::NoResults {
            results: Vec::new(),
            message: format!(
                "No knowledge found for '{query}'. Try searching with a connector tool directly."
            ),
        }
    }

    pub fn results(&self) -> &[SearchHit] {
        match self {
            SearchResponse::Found { results, .. } | SearchResponse::NoResults { results, .. } => {
                results
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }

    /// JSON text returned to the model.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| r#"{"results": []}"#.to_string())
    }
}

/// Row counts across the three knowledge tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeStats {
    pub items: u64,
    pub entities: u64,
    pub links: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_roundtrips_storage_strings() {
        for kind in [
            EntityKind::Person,
            EntityKind::Repo,
            EntityKind::Topic,
            EntityKind::Ticker,
        ] {
            assert_eq!(EntityKind::from_str_value(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::from_str_value("company"), None);
    }

    #[test]
    fn entity_text_skips_blank_mentions() {
        let item = ExtractedItem {
            source_id: "x".into(),
            event_date: None,
            title: String::new(),
            snippet: String::new(),
            metadata: serde_json::json!({}),
            entities: vec![
                EntityMention::new(EntityKind::Person, " Jane Doe ", EntityRole::Sender),
                EntityMention::new(EntityKind::Person, "  ", EntityRole::Recipient),
                EntityMention::new(EntityKind::Topic, "deadline", EntityRole::Mentioned),
            ],
        };
        assert_eq!(item.entity_text(), "Jane Doe deadline");
    }

    #[test]
    fn no_results_serializes_message() {
        let json: serde_json::Value =
            serde_json::from_str(&SearchResponse::no_results("xyz").to_json()).unwrap();
        assert_eq!(json["results"], serde_json::json!([]));
        assert!(json["message"].as_str().unwrap().contains("No knowledge found for 'xyz'"));
        assert!(json.get("count").is_none());
    }

    #[test]
    fn found_serializes_count_and_hides_id() {
        let hit = SearchHit {
            id: 7,
            connector: "gmail".into(),
            tool: "gmail_search".into(),
            source_id: "msg1".into(),
            date: "2024-01-01T10:00:00".into(),
            title: "Project update".into(),
            snippet: String::new(),
            metadata: serde_json::json!({}),
            account: String::new(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&SearchResponse::from_hits("q", vec![hit]).to_json()).unwrap();
        assert_eq!(json["count"], 1);
        assert!(json["results"][0].get("id").is_none());
        assert_eq!(json["results"][0]["title"], "Project update");
    }
}
