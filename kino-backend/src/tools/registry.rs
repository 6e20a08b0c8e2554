use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{AddNoteTool, DeleteNoteTool, GetMyNotesTool};
use super::types::{ToolContext, ToolDefinition, ToolResult};

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        if self.tools.insert(name.clone(), tool).is_some() {
            log::warn!("[TOOLS] Replaced existing tool '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions sorted by name, for a stable `tools/list`
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Run a tool by name; `None` if no such tool is registered
    pub async fn execute(
        &self,
        name: &str,
        params: Value,
        context: &ToolContext,
    ) -> Option<ToolResult> {
        let tool = self.get(name)?;
        Some(tool.execute(params, context).await)
    }
}

/// Registry with the note tools
pub fn create_default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetMyNotesTool::new()));
    registry.register(Arc::new(AddNoteTool::new()));
    registry.register(Arc::new(DeleteNoteTool::new()));
    registry
}
