use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use snapref_core::{Error, Result};
use tracing::{debug, warn};

use crate::snapshot::SnapshotTool;
use crate::{Tool, ToolContext};

#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SnapshotTool::new()));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        debug!(name = schema.name, "Registering tool");
        self.tools.insert(schema.name.to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                let schema = tool.schema();
                json!({
                    "type": "function",
                    "function": {
                        "name": schema.name,
                        "description": schema.description,
                        "parameters": schema.parameters
                    }
                })
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub async fn execute(&self, name: &str, ctx: ToolContext, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::Validation(format!("Unknown tool: {}", name)))?;

        if let Err(e) = tool.validate(&params) {
            warn!(tool = name, error = %e, "Tool validation failed");
            return Err(e);
        }

        debug!(tool = name, "Executing tool");
        tool.execute(ctx, params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new_empty() {
        let reg = ToolRegistry::new();
        assert!(reg.tool_names().is_empty());
        assert!(reg.get("snapshot").is_none());
    }

    #[test]
    fn test_registry_with_defaults() {
        let reg = ToolRegistry::with_defaults();
        assert_eq!(reg.tool_names(), vec!["snapshot".to_string()]);
        assert!(reg.get("snapshot").is_some());
    }

    #[test]
    fn test_registry_get_tool_schemas() {
        let reg = ToolRegistry::with_defaults();
        let schemas = reg.get_tool_schemas();
        assert_eq!(schemas.len(), 1);
        for schema in &schemas {
            assert_eq!(schema["type"], "function");
            assert!(schema["function"]["name"].is_string());
            assert!(schema["function"]["description"].is_string());
            assert_eq!(schema["function"]["parameters"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let reg = ToolRegistry::with_defaults();
        let out = reg
            .execute(
                "snapshot",
                ToolContext::default(),
                json!({"action": "search", "snapshot": "- button \"Go\"", "query": "go"}),
            )
            .await
            .unwrap();
        assert!(out["results"].as_str().unwrap().contains("[path=0]"));
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_tool_and_bad_params() {
        let reg = ToolRegistry::with_defaults();
        let err = reg
            .execute("browse", ToolContext::default(), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = reg
            .execute("snapshot", ToolContext::default(), json!({"action": "index"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_registered_tool_keeps_refs_between_calls() {
        let reg = ToolRegistry::with_defaults();
        reg.execute(
            "snapshot",
            ToolContext::default(),
            json!({"action": "snapshot", "snapshot": "- link \"Home\""}),
        )
        .await
        .unwrap();
        let out = reg
            .execute(
                "snapshot",
                ToolContext::default(),
                json!({"action": "resolve_ref", "ref": "@e1"}),
            )
            .await
            .unwrap();
        assert_eq!(out["role"], "link");
    }
}
