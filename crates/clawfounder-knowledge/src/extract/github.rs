// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code-hosting connector: notifications, pull requests and issues.

use serde_json::{json, Value};

use super::{field_str, field_text, first_present, scalar_text, ExtractContext, Extractor};
use crate::dates::normalize_event_date;
use crate::types::{EntityKind, EntityMention, EntityRole, ExtractedItem};

const NOTIFICATIONS_TOOL: &str = "github_notifications";

#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubExtractor;

impl Extractor for GitHubExtractor {
    fn extract(
        &self,
        tool_name: &str,
        records: &[Value],
        _args: &Value,
        ctx: &ExtractContext<'_>,
    ) -> Vec<ExtractedItem> {
        records
            .iter()
            .filter(|record| record.is_object())
            .filter_map(|record| {
                if tool_name == NOTIFICATIONS_TOOL {
                    extract_notification(record)
                } else {
                    extract_work_item(tool_name, record, ctx)
                }
            })
            .collect()
    }
}

fn extract_notification(record: &Value) -> Option<ExtractedItem> {
    let id = field_text(record, "id");
    if id.is_empty() {
        return None;
    }

    let repo = repo_name(record, &["repository", "repo"]);
    let (title, subject_type) = match record.get("subject") {
        Some(subject @ Value::Object(_)) => (
            field_str(subject, "title").to_string(),
            field_str(subject, "type").to_string(),
        ),
        Some(other) => (scalar_text(other), String::new()),
        None => (String::new(), String::new()),
    };
    let reason = field_str(record, "reason");

    let mut entities = Vec::new();
    if !repo.is_empty() {
        entities.push(EntityMention::new(EntityKind::Repo, repo.as_str(), EntityRole::Mentioned));
    }

    Some(ExtractedItem {
        source_id: format!("notif-{id}"),
        event_date: first_present(record, &["updated_at", "updated"]).and_then(normalize_event_date),
        title,
        snippet: format!("{reason} - {subject_type} in {repo}"),
        metadata: json!({ "repo": repo, "reason": reason, "type": subject_type }),
        entities,
    })
}

fn extract_work_item(
    tool_name: &str,
    record: &Value,
    ctx: &ExtractContext<'_>,
) -> Option<ExtractedItem> {
    let title = field_str(record, "title");
    let number = field_text(record, "number");
    if title.is_empty() && number.is_empty() {
        return None;
    }

    let mut entities = Vec::new();
    let author = login(record.get("author"));
    if !author.is_empty() {
        entities.push(EntityMention::new(EntityKind::Person, author, EntityRole::Author));
    }
    for assignee in array(record, "assignees") {
        let assignee = login(Some(assignee));
        if !assignee.is_empty() {
            entities.push(EntityMention::new(EntityKind::Person, assignee, EntityRole::Assignee));
        }
    }
    for label in array(record, "labels") {
        let label = match label {
            Value::Object(_) => field_str(label, "name").to_string(),
            other => scalar_text(other),
        };
        if !label.is_empty() {
            entities.push(EntityMention::new(EntityKind::Topic, label, EntityRole::Mentioned));
        }
    }

    let repo = repo_name(record, &["repo", "full_name"]);
    if !repo.is_empty() {
        entities.push(EntityMention::new(EntityKind::Repo, repo.as_str(), EntityRole::Mentioned));
    }
    entities.extend(ctx.topic_mentions(title));

    let lower_tool = tool_name.to_lowercase();
    let kind = if lower_tool.contains("pr") || lower_tool.contains("review") {
        "pr"
    } else {
        "issue"
    };
    let source_id = if repo.is_empty() {
        format!("{kind}-{number}")
    } else {
        format!("{kind}-{repo}-{number}")
    };

    let body = first_present(record, &["body", "body_preview"])
        .map(scalar_text)
        .unwrap_or_default();

    Some(ExtractedItem {
        source_id,
        event_date: first_present(record, &["created_at", "updated_at", "created"])
            .and_then(normalize_event_date),
        title: title.to_string(),
        snippet: ctx.snippet(&body),
        metadata: json!({
            "repo": repo,
            "state": field_str(record, "state"),
            "number": record.get("number").cloned().unwrap_or(Value::Null),
            "url": field_str(record, "url"),
        }),
        entities,
    })
}

/// Repository name from a plain string or an object with `full_name`.
fn repo_name(record: &Value, keys: &[&str]) -> String {
    match first_present(record, keys) {
        Some(repo @ Value::Object(_)) => field_str(repo, "full_name").to_string(),
        Some(other) => scalar_text(other),
        None => String::new(),
    }
}

/// User name from a plain string or an object with `login`.
fn login(value: Option<&Value>) -> String {
    match value {
        Some(user @ Value::Object(_)) => field_str(user, "login").to_string(),
        Some(other) => scalar_text(other),
        None => String::new(),
    }
}

fn array<'v>(record: &'v Value, key: &str) -> &'v [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
