// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Market quotes from the Yahoo Finance connector.
//!
//! Quotes have no natural id, so the source id is the symbol plus the
//! ingestion day: at most one row per symbol per day, refreshed in place.

use serde_json::{json, Value};

use super::{field_str, scalar_text, ExtractContext, Extractor};
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

#[derive(Debug, Default, Clone, Copy)]
pub struct FinanceExtractor;

impl Extractor for FinanceExtractor {
    fn extract(
        &self,
        _tool_name: &str,
        records: &[Value],
        _args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        records
            .iter()
            .filter_map(|record| extract_quote(record, ctx))
            .collect()
    }
}

fn extract_quote(record: &Value, ctx: &ExtractContext<'_>) -> Option<ExtractedItem> {
    let symbol = field_str(record, "symbol").trim();
    if symbol.is_empty() {
        return None;
    }
    let name = match field_str(record, "name").trim() {
        "" => symbol,
        name => name,
    };

    let mut entities = vec![EntityMention::new(EntityKind::Ticker, symbol, EntityRole::Mentioned)];
    if name != symbol {
        entities.push(EntityMention::new(EntityKind::Ticker, name, EntityRole::Mentioned));
    }

    let field = |key: &str| record.get(key).cloned().unwrap_or(Value::Null);

    Some(ExtractedItem {
        source_id: format!("quote-{symbol}-{}", ctx.now.format("%Y%m%d")),
        event_date: Some(ctx.now_timestamp()),
        title: format!("{symbol} ({name})"),
        snippet: ctx.snippet(&format!(
            "Price: {}, Change: {}%",
            display_or_na(record.get("price")),
            display_or_na(record.get("change_percent")),
        )),
        metadata: json!({
            "symbol": symbol,
            "price": field("price"),
            "change": field("change"),
            "change_percent": field("change_percent"),
        }),
        entities,
    })
}

fn display_or_na(value: Option<&Value>) -> String {
    match value.map(scalar_text) {
        Some(text) if !text.is_empty() => text,
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::ctx;

    #[test]
    fn quote_is_keyed_by_symbol_and_day() {
        let records = vec![json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 189.5,
            "change": 1.2,
            "change_percent": 0.64
        })];
        let items = FinanceExtractor.extract("yahoo_finance_quote", &records, &Value::Null, &ctx());
        let item = &items[0];
        assert_eq!(item.source_id, "quote-AAPL-20240305");
        assert_eq!(item.event_date.as_deref(), Some("2024-03-05T09:30:00"));
        assert_eq!(item.title, "AAPL (Apple Inc.)");
        assert_eq!(item.snippet, "Price: 189.5, Change: 0.64%");
        assert_eq!(item.entities.len(), 2);
        assert!(item.entities.iter().all(|m| m.kind == EntityKind::Ticker));
    }

    #[test]
    fn missing_fields_render_as_na() {
        let records = vec![json!({"symbol": "MSFT"})];
        let items = FinanceExtractor.extract("yahoo_finance_quote", &records, &Value::Null, &ctx());
        assert_eq!(items[0].title, "MSFT (MSFT)");
        assert_eq!(items[0].snippet, "Price: N/A, Change: N/A%");
        assert_eq!(items[0].entities.len(), 1);
    }

    #[test]
    fn records_without_symbol_are_skipped() {
        let records = vec![json!({"name": "Nothing"}), json!(42)];
        assert!(FinanceExtractor
            .extract("yahoo_finance_search", &records, &Value::Null, &ctx())
            .is_empty());
    }
}
