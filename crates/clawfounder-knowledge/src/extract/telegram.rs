// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat messages from the Telegram connector.

use serde_json::{json, Value};

use super::{field_str, field_text, ExtractContext, Extractor};
use crate::dates::normalize_event_date;
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

const UNKNOWN_SENDER: &str = "Unknown";

#[derive(Debug, Default, Clone, Copy)]
pub struct TelegramExtractor;

impl Extractor for TelegramExtractor {
    fn extract(
        &self,
        _tool_name: &str,
        records: &[Value],
        _args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        records
            .iter()
            .filter_map(|record| extract_message(record, ctx))
            .collect()
    }
}

fn extract_message(record: &Value, ctx: &ExtractContext<'_>) -> Option<ExtractedItem> {
    record.as_object()?;
    let text = field_str(record, "text");
    let date = field_text(record, "date");
    // Status objects ({"ok": true}, {"error": ...}) carry neither.
    if text.is_empty() && date.is_empty() {
        return None;
    }

    let sender = match field_str(record, "from").trim() {
        "" => UNKNOWN_SENDER,
        sender => sender,
    };

    let mut entities = Vec::new();
    if sender != UNKNOWN_SENDER {
        entities.push(EntityMention::new(EntityKind::Person, sender, EntityRole::Sender));
    }
    entities.extend(ctx.topic_mentions(text));

    Some(ExtractedItem {
        source_id: format!("tg-{date}-{sender}"),
        event_date: record.get("date").and_then(normalize_event_date),
        title: format!("Message from {sender}"),
        snippet: ctx.snippet(text),
        metadata: json!({ "from": sender }),
        entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::ctx;

    #[test]
    fn message_from_known_sender() {
        let records = vec![json!({
            "from": "Ana",
            "text": "release is tomorrow",
            "date": 1704103200
        })];
        let items = TelegramExtractor.extract("telegram_get_updates", &records, &Value::Null, &ctx());
        let item = &items[0];
        assert_eq!(item.source_id, "tg-1704103200-Ana");
        assert_eq!(item.title, "Message from Ana");
        assert_eq!(item.event_date.as_deref(), Some("2024-01-01T10:00:00"));
        assert_eq!(item.entities[0].value, "Ana");
        assert_eq!(item.entities[0].role, EntityRole::Sender);
        assert!(item.entities.iter().any(|m| m.value == "release"));
    }

    #[test]
    fn unknown_sender_is_not_a_person() {
        let records = vec![json!({"text": "hi", "date": "2024-01-02T00:00:00"})];
        let items = TelegramExtractor.extract("telegram_get_updates", &records, &Value::Null, &ctx());
        assert_eq!(items[0].title, "Message from Unknown");
        assert!(items[0].entities.is_empty());
    }

    #[test]
    fn status_objects_are_skipped() {
        let records = vec![json!({"ok": true})];
        assert!(TelegramExtractor
            .extract("telegram_send_message", &records, &Value::Null, &ctx())
            .is_empty());
    }
}
