// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Table rows from the Supabase connector.

use serde_json::{json, Value};

use super::{email_mentions, field_str, field_text, first_present, ExtractContext, Extractor};
use crate::dates::normalize_event_date;
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

/// Rows only; a bare object result is a status or error payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct SupabaseExtractor;

impl Extractor for SupabaseExtractor {
    fn accepts_single_record(&self) -> bool {
        false
    }

    fn extract(
        &self,
        _tool_name: &str,
        records: &[Value],
        args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        let table = match field_str(args, "table").trim() {
            "" => "unknown",
            table => table,
        };
        records
            .iter()
            .filter_map(|row| extract_row(table, row, ctx))
            .collect()
    }
}

fn extract_row(table: &str, row: &Value, ctx: &ExtractContext<'_>) -> Option<ExtractedItem> {
    row.as_object()?;
    let row_id = match field_text(row, "id") {
        id if !id.is_empty() => id,
        _ => field_text(row, "_id"),
    };
    if row_id.is_empty() {
        return None;
    }

    let mut entities = vec![EntityMention::new(
        EntityKind::Topic,
        "supabase",
        EntityRole::Mentioned,
    )];
    entities.extend(email_mentions(row));

    let event_date = first_present(row, &["created_at", "updated_at"])
        .and_then(normalize_event_date)
        .unwrap_or_else(|| ctx.now_timestamp());

    Some(ExtractedItem {
        source_id: format!("supa-{table}-{row_id}"),
        event_date: Some(event_date),
        title: format!("{table}/{row_id}"),
        snippet: ctx.snippet(&row.to_string()),
        metadata: json!({ "table": table, "id": row_id }),
        entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::ctx;

    #[test]
    fn rows_use_table_from_args() {
        let records = vec![
            json!({"id": 1, "owner": "bo@corp.io", "created_at": "2024-01-09T07:00:00+00:00"}),
            json!({"id": 2}),
        ];
        let args = json!({"table": "orders"});
        let items = SupabaseExtractor.extract("supabase_query", &records, &args, &ctx());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_id, "supa-orders-1");
        assert_eq!(items[0].title, "orders/1");
        assert_eq!(items[0].event_date.as_deref(), Some("2024-01-09T07:00:00"));
        assert!(items[0].entities.iter().any(|m| m.value == "bo@corp.io"));
        assert_eq!(items[1].event_date.as_deref(), Some("2024-03-05T09:30:00"));
    }

    #[test]
    fn table_defaults_to_unknown() {
        let records = vec![json!({"id": "a"})];
        let items = SupabaseExtractor.extract("supabase_query", &records, &Value::Null, &ctx());
        assert_eq!(items[0].source_id, "supa-unknown-a");
    }

    #[test]
    fn single_objects_are_rejected_by_the_registry() {
        use crate::extract::ExtractorRegistry;

        let registry = ExtractorRegistry::with_defaults();
        let object = json!({"id": 1}).to_string();
        assert!(registry
            .extract("supabase", "supabase_query", &object, &Value::Null, &ctx())
            .is_empty());
        let rows = json!([{"id": 1}]).to_string();
        assert_eq!(
            registry
                .extract("supabase", "supabase_query", &rows, &Value::Null, &ctx())
                .len(),
            1
        );
    }
}
