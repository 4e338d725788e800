// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `search_knowledge` tool exposed to the model.

use std::sync::Arc;

use async_trait::async_trait;
use clawfounder_core::{ClawfounderError, Tool, ToolDefinition, ToolOutput};

use crate::base::{KnowledgeBase, MAX_SEARCH_RESULTS};

const TOOL_NAME: &str = "search_knowledge";

const TOOL_DESCRIPTION: &str = "Search everything previously seen across connected services \
(email, GitHub, Telegram, finance quotes, databases) by person, repo, topic, ticker or \
free text. Use this before calling a connector tool to recall earlier results.";

fn parameters_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Names, topics or keywords to look for"
            },
            "connector": {
                "type": "string",
                "description": "Only search results from this connector (e.g. gmail, github)"
            },
            "max_results": {
                "type": "integer",
                "minimum": 1,
                "maximum": MAX_SEARCH_RESULTS,
                "description": "Maximum number of results to return"
            }
        },
        "required": ["query"]
    })
}

/// Provider-neutral descriptor of `search_knowledge`, for callers that
/// register tools before the knowledge base is open.
pub fn search_knowledge_definition() -> ToolDefinition {
    ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        parameters: parameters_schema(),
    }
}

/// Runs [`KnowledgeBase::search`] on behalf of the model.
pub struct SearchKnowledgeTool {
    kb: Arc<KnowledgeBase>,
}

impl SearchKnowledgeTool {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl Tool for SearchKnowledgeTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        parameters_schema()
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, ClawfounderError> {
        let query = input["query"].as_str().ok_or_else(|| {
            ClawfounderError::InvalidInput("missing required 'query' parameter".to_string())
        })?;
        let connector = input["connector"].as_str().filter(|c| !c.trim().is_empty());
        let max_results = match &input["max_results"] {
            serde_json::Value::Null => None,
            value => match value.as_u64().filter(|n| *n > 0) {
                Some(n) => Some(usize::try_from(n).unwrap_or(MAX_SEARCH_RESULTS)),
                None => {
                    return Ok(ToolOutput::error(format!(
                        "max_results must be a positive integer, got {value}"
                    )));
                }
            },
        };

        let response = self.kb.search(query, connector, max_results).await;
        Ok(ToolOutput::ok(response.to_json()))
    }
}
