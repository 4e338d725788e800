// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailbox connectors (`gmail`, `work_email`).

use serde_json::{json, Value};

use super::{field_str, field_text, first_present, ExtractContext, Extractor};
use crate::dates::normalize_event_date;
use crate::text::parse_email_address;
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

/// Messages keyed by provider message id.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailExtractor;

impl Extractor for EmailExtractor {
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
    let source_id = field_text(record, "id");
    if source_id.trim().is_empty() {
        return None;
    }

    let from = field_str(record, "from");
    let to = field_str(record, "to");
    let mut entities = Vec::new();
    push_address(&mut entities, from, EntityRole::Sender);
    push_address(&mut entities, to, EntityRole::Recipient);

    let subject = field_str(record, "subject");
    let body = first_present(record, &["snippet", "body"])
        .and_then(Value::as_str)
        .unwrap_or("");
    let snippet = ctx.snippet(body);
    entities.extend(ctx.topic_mentions(&format!("{subject} {snippet}")));

    Some(ExtractedItem {
        source_id,
        event_date: record.get("date").and_then(normalize_event_date),
        title: subject.to_string(),
        snippet,
        metadata: json!({ "from": from, "to": to }),
        entities,
    })
}

/// Name and address of a header each become a person mention.
fn push_address(entities: &mut Vec<EntityMention>, header: &str, role: EntityRole) {
    let (name, address) = parse_email_address(header);
    for value in [name, address] {
        if !value.is_empty() {
            entities.push(EntityMention::new(EntityKind::Person, value, role));
        }
    }
}
