pub mod registry;
pub mod snapshot;

use async_trait::async_trait;
use serde_json::Value;
use snapref_core::{Config, Result};

pub use registry::ToolRegistry;
pub use snapshot::{RefMap, RefStore, SnapshotTool};

/// Per-call context handed to every tool.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Supplies defaults for options a call leaves out.
    pub config: Config,
}

impl ToolContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;
    fn validate(&self, params: &Value) -> Result<()>;
    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value>;
}
