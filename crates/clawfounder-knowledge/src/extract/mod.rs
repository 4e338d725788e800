// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction dispatch: turning raw tool results into knowledge items.
//!
//! Each connector family has one [`Extractor`]. The [`ExtractorRegistry`]
//! resolves a connector id to its family, checks that the result is
//! JSON-shaped, parses it into a list of records and hands those to the
//! family's extractor. Extractors are pure functions of their input and never
//! fail: records they cannot make sense of are skipped.

pub mod email;
pub mod finance;
pub mod firebase;
pub mod github;
pub mod supabase;
pub mod telegram;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::dates::format_timestamp;
use crate::text::{extract_topics, looks_like_email, truncate_chars};
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

pub use email::EmailExtractor;
pub use finance::FinanceExtractor;
pub use firebase::FirebaseExtractor;
pub use github::GitHubExtractor;
pub use supabase::SupabaseExtractor;
pub use telegram::TelegramExtractor;

/// Connector families with a dedicated extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorFamily {
    Email,
    GitHub,
    Telegram,
    Finance,
    Firebase,
    Supabase,
}

/// Connector-id prefixes, checked in order.
const FAMILY_PREFIXES: &[(&str, ConnectorFamily)] = &[
    ("gmail", ConnectorFamily::Email),
    ("work", ConnectorFamily::Email),
    ("github", ConnectorFamily::GitHub),
    ("telegram", ConnectorFamily::Telegram),
    ("yahoo", ConnectorFamily::Finance),
    ("firebase", ConnectorFamily::Firebase),
    ("supabase", ConnectorFamily::Supabase),
];

impl ConnectorFamily {
    /// Family for a connector id such as `gmail` or `work_email`.
    pub fn resolve(connector: &str) -> Option<Self> {
        FAMILY_PREFIXES
            .iter()
            .find(|(prefix, _)| connector.starts_with(prefix))
            .map(|(_, family)| *family)
    }
}

/// Per-call inputs shared by every extractor.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    pub snippet_length: usize,
    pub max_topics: usize,
    pub vocabulary: &'a BTreeSet<String>,
    /// Ingestion time, used by families whose records carry no date.
    pub now: DateTime<Utc>,
}

impl ExtractContext<'_> {
    /// Truncate a body preview to the configured snippet length.
    pub fn snippet(&self, text: &str) -> String {
        truncate_chars(text, self.snippet_length)
    }

    /// Topic mentions found in `text`.
    pub fn topic_mentions(&self, text: &str) -> Vec<EntityMention> {
        extract_topics(text, self.vocabulary, self.max_topics)
            .into_iter()
            .map(|topic| EntityMention::new(EntityKind::Topic, topic, EntityRole::Mentioned))
            .collect()
    }

    pub fn now_timestamp(&self) -> String {
        format_timestamp(self.now)
    }
}

/// Turns the records of one tool result into knowledge items.
pub trait Extractor: Send + Sync {
    /// Whether a bare JSON object counts as a single record. Families that
    /// only understand row lists return `false`.
    fn accepts_single_record(&self) -> bool {
        true
    }

    fn extract(
        &self,
        tool_name: &str,
        records: &[Value],
        args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem>;
}

/// Maps connector families to their extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<ConnectorFamily, Box<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("families", &self.extractors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtractorRegistry {
    /// A registry with no extractors; every connector is skipped.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// A registry with the built-in extractor for every family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ConnectorFamily::Email, Box::new(EmailExtractor));
        registry.register(ConnectorFamily::GitHub, Box::new(GitHubExtractor));
        registry.register(ConnectorFamily::Telegram, Box::new(TelegramExtractor));
        registry.register(ConnectorFamily::Finance, Box::new(FinanceExtractor));
        registry.register(ConnectorFamily::Firebase, Box::new(FirebaseExtractor));
        registry.register(ConnectorFamily::Supabase, Box::new(SupabaseExtractor));
        registry
    }

    /// Install or replace the extractor for `family`.
    pub fn register(&mut self, family: ConnectorFamily, extractor: Box<dyn Extractor>) {
        self.extractors.insert(family, extractor);
    }

    /// Extract items from one raw tool result.
    ///
    /// Returns nothing for unknown connectors, results that are not JSON
    /// objects or arrays, and malformed JSON.
    pub fn extract(
        &self,
        connector: &str,
        tool_name: &str,
        result: &str,
        args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        let trimmed = result.trim();
        if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return Vec::new();
        }

        let Some(family) = ConnectorFamily::resolve(connector) else {
            debug!(connector, "no extractor for connector, skipping");
            return Vec::new();
        };
        let Some(extractor) = self.extractors.get(&family) else {
            return Vec::new();
        };

        let payload: Value = match serde_json::from_str(trimmed) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(connector, tool = tool_name, error = %e, "tool result is not valid JSON, skipping");
                return Vec::new();
            }
        };

        let records = match payload {
            Value::Array(records) => records,
            record @ Value::Object(_) if extractor.accepts_single_record() => vec![record],
            _ => return Vec::new(),
        };

        let mut items = extractor.extract(tool_name, &records, args, ctx);
        items.retain(|item| !item.source_id.trim().is_empty());
        items
    }
}

/// String field, empty when missing or not a string.
pub(crate) fn field_str<'v>(record: &'v Value, key: &str) -> &'v str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Scalar field rendered as text: strings as-is, numbers and booleans via
/// `Display`, anything else empty.
pub(crate) fn field_text(record: &Value, key: &str) -> String {
    record.get(key).map(scalar_text).unwrap_or_default()
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First of `keys` whose value is present, non-null and not an empty string.
pub(crate) fn first_present<'v>(record: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter().filter_map(|key| record.get(*key)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// Person mentions for every email-looking string value of a record.
pub(crate) fn email_mentions(record: &Value) -> Vec<EntityMention> {
    let Some(fields) = record.as_object() else {
        return Vec::new();
    };
    fields
        .values()
        .filter_map(Value::as_str)
        .filter(|v| looks_like_email(v))
        .map(|v| EntityMention::new(EntityKind::Person, v, EntityRole::Mentioned))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;
    use std::sync::LazyLock;

    use chrono::{TimeZone, Utc};

    use super::ExtractContext;

    pub static VOCABULARY: LazyLock<BTreeSet<String>> = LazyLock::new(|| {
        ["deadline", "deploy", "bug", "release", "invoice"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    pub fn ctx() -> ExtractContext<'static> {
        ExtractContext {
            snippet_length: 200,
            max_topics: 5,
            vocabulary: &*VOCABULARY,
            now: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ctx;
    use super::*;
    use serde_json::json;

    #[test]
    fn families_resolve_by_prefix() {
        assert_eq!(ConnectorFamily::resolve("gmail"), Some(ConnectorFamily::Email));
        assert_eq!(ConnectorFamily::resolve("work_email"), Some(ConnectorFamily::Email));
        assert_eq!(ConnectorFamily::resolve("github"), Some(ConnectorFamily::GitHub));
        assert_eq!(ConnectorFamily::resolve("yahoo_finance"), Some(ConnectorFamily::Finance));
        assert_eq!(ConnectorFamily::resolve("supabase"), Some(ConnectorFamily::Supabase));
        assert_eq!(ConnectorFamily::resolve("slack"), None);
        assert_eq!(ConnectorFamily::resolve("whatsapp"), None);
    }

    #[test]
    fn non_json_results_are_skipped() {
        let registry = ExtractorRegistry::with_defaults();
        let items = registry.extract("gmail", "gmail_search", "No unread mail.", &Value::Null, &ctx());
        assert!(items.is_empty());
        let items = registry.extract("gmail", "gmail_search", "[{broken", &Value::Null, &ctx());
        assert!(items.is_empty());
    }

    #[test]
    fn unknown_connector_is_skipped() {
        let registry = ExtractorRegistry::with_defaults();
        let result = json!([{"id": "m1", "subject": "hi"}]).to_string();
        assert!(registry
            .extract("slack", "slack_history", &result, &Value::Null, &ctx())
            .is_empty());
    }

    #[test]
    fn single_object_is_one_record() {
        let registry = ExtractorRegistry::with_defaults();
        let result = json!({"id": "m1", "subject": "hello"}).to_string();
        let items = registry.extract("gmail", "gmail_read_email", &result, &Value::Null, &ctx());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_id, "m1");
    }

    #[test]
    fn empty_registry_extracts_nothing() {
        let registry = ExtractorRegistry::empty();
        let result = json!([{"id": "m1"}]).to_string();
        assert!(registry
            .extract("gmail", "gmail_search", &result, &Value::Null, &ctx())
            .is_empty());
    }

    #[test]
    fn first_present_skips_blank_values() {
        let record = json!({"a": "", "b": null, "c": "x"});
        assert_eq!(first_present(&record, &["a", "b", "c"]), Some(&json!("x")));
        assert_eq!(first_present(&record, &["a", "b"]), None);
    }

    #[test]
    fn email_mentions_pick_address_like_values() {
        let record = json!({"owner": "ana@corp.io", "note": "ping @ana", "n": 3});
        let mentions = email_mentions(&record);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].value, "ana@corp.io");
    }
}
