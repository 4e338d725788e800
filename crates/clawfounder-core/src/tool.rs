// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait shared with the LLM-facing orchestration layer.
//!
//! The orchestration layer owns the per-provider wire formats; this crate
//! only describes a tool (name, description, JSON Schema parameters) and
//! invokes it with the parsed JSON arguments from the model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClawfounderError;

/// Output from a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The content returned by the tool (usually JSON text).
    pub content: String,
    /// Whether the tool invocation resulted in an error.
    pub is_error: bool,
}

impl ToolOutput {
    /// A successful output.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// An error output the model can read and recover from.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Provider-neutral tool descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's input object.
    pub parameters: serde_json::Value,
}

/// A tool the model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name used for lookup and serialization.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invoke the tool with the model's JSON input.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, ClawfounderError>;

    /// The descriptor handed to the orchestration layer.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, ClawfounderError> {
            Ok(ToolOutput::ok(input.to_string()))
        }
    }

    #[test]
    fn definition_uses_trait_methods() {
        let def = Echo.definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.description, "Echo the input back");
        assert_eq!(def.parameters["type"], "object");
    }

    #[tokio::test]
    async fn invoke_returns_output() {
        let out = Echo.invoke(serde_json::json!({"a": 1})).await.unwrap();
        assert!(!out.is_error);
        assert_eq!(out.content, r#"{"a":1}"#);
    }
}
