// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed cache keys.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Key of one tool invocation: SHA-256 over `{"account","args","tool"}`
/// rendered as canonical JSON.
pub fn cache_key(tool: &str, args: &Value, account: Option<&str>) -> String {
    let payload = json!({
        "tool": tool,
        "args": args,
        "account": account,
    });
    sha256_hex(&canonical_json(payload))
}

/// Key of a briefing bundle gathered from `connectors`.
///
/// Order and duplicates in the input do not change the key.
pub fn briefing_key<S: AsRef<str>>(connectors: &[S]) -> String {
    let names: BTreeSet<&str> = connectors.iter().map(AsRef::as_ref).collect();
    sha256_hex(&canonical_json(json!(names)))
}

fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Compact JSON with object keys sorted at every level.
fn canonical_json(value: Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(String, Value)> = object.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_argument_order() {
        let a = cache_key("gmail_search", &json!({"query": "x", "max": 5}), None);
        let b = cache_key("gmail_search", &json!({"max": 5, "query": "x"}), None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_separates_tool_args_and_account() {
        let base = cache_key("gmail_search", &json!({"query": "x"}), None);
        assert_ne!(base, cache_key("gmail_read", &json!({"query": "x"}), None));
        assert_ne!(base, cache_key("gmail_search", &json!({"query": "y"}), None));
        assert_ne!(base, cache_key("gmail_search", &json!({"query": "x"}), Some("work")));
    }

    #[test]
    fn canonical_form_sorts_nested_keys() {
        let rendered = canonical_json(json!({"b": {"z": 1, "a": [ {"y": 2, "x": 1} ]}, "a": null}));
        assert_eq!(rendered, r#"{"a":null,"b":{"a":[{"x":1,"y":2}],"z":1}}"#);
    }

    #[test]
    fn briefing_key_is_order_independent() {
        let a = briefing_key(&["gmail", "github", "telegram"]);
        let b = briefing_key(&["telegram", "gmail", "github", "gmail"]);
        assert_eq!(a, b);
        assert_ne!(a, briefing_key(&["gmail"]));
    }
}
