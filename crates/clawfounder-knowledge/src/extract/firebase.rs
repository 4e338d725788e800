// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Firestore documents.

use serde_json::{json, Map, Value};

use super::{email_mentions, field_str, field_text, ExtractContext, Extractor};
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

#[derive(Debug, Default, Clone, Copy)]
pub struct FirebaseExtractor;

impl Extractor for FirebaseExtractor {
    fn extract(
        &self,
        _tool_name: &str,
        records: &[Value],
        _args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        records
            .iter()
            .filter_map(|record| extract_document(record, ctx))
            .collect()
    }
}

fn extract_document(record: &Value, ctx: &ExtractContext<'_>) -> Option<ExtractedItem> {
    let fields = record.as_object()?;
    let doc_id = match field_text(record, "_id") {
        id if !id.is_empty() => id,
        _ => field_text(record, "id"),
    };
    let doc_path = field_str(record, "_path");
    let key = if doc_path.is_empty() {
        doc_id.as_str()
    } else {
        doc_path
    };
    if key.is_empty() {
        return None;
    }

    let mut entities = vec![EntityMention::new(
        EntityKind::Topic,
        "firebase",
        EntityRole::Mentioned,
    )];
    entities.extend(email_mentions(record));

    // Underscore-prefixed keys are connector bookkeeping, not document data.
    let preview: Map<String, Value> = fields
        .iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let preview = Value::Object(preview).to_string();

    Some(ExtractedItem {
        source_id: format!("fb-{key}"),
        event_date: Some(ctx.now_timestamp()),
        title: format!("Firestore: {key}"),
        snippet: ctx.snippet(&preview),
        metadata: json!({ "path": doc_path, "id": doc_id }),
        entities,
    })
}
