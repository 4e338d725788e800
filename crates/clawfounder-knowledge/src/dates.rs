// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-date normalization.
//!
//! Stored dates are `YYYY-MM-DDTHH:MM:SS` (UTC where the source says so) so
//! that lexical order matches chronological order.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::text::truncate_chars;

/// Storage format for every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const TIMESTAMP_LEN: usize = 19;

static ISO_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

static EPOCH_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9,11}(\.\d+)?$").unwrap());

/// Format a UTC instant in the storage format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Normalize a raw JSON date field.
///
/// Numbers are epoch seconds. Strings go through [`normalize_date_str`].
/// Anything else is treated as missing.
pub fn normalize_event_date(raw: &Value) -> Option<String> {
    match raw {
        Value::Number(n) => n.as_f64().and_then(epoch_to_timestamp),
        Value::String(s) => normalize_date_str(s),
        _ => None,
    }
}

/// Normalize a date string.
///
/// ISO-8601 prefixes are truncated to second precision, RFC 2822 dates are
/// converted to UTC and digit-only strings are read as epoch seconds. Anything
/// unparseable is kept verbatim (truncated) rather than dropped.
pub fn normalize_date_str(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if ISO_PREFIX.is_match(raw) {
        return Some(truncate_chars(raw, TIMESTAMP_LEN));
    }

    if EPOCH_TEXT.is_match(raw) {
        if let Some(ts) = raw.parse::<f64>().ok().and_then(epoch_to_timestamp) {
            return Some(ts);
        }
    }

    // Mail headers often carry a trailing zone comment: "... +0000 (UTC)".
    let without_comment = match raw.rfind(" (") {
        Some(idx) if raw.ends_with(')') => &raw[..idx],
        _ => raw,
    };
    if let Ok(parsed) = DateTime::parse_from_rfc2822(without_comment) {
        return Some(format_timestamp(parsed.with_timezone(&Utc)));
    }

    Some(truncate_chars(raw, TIMESTAMP_LEN))
}

fn epoch_to_timestamp(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0).map(format_timestamp)
}
