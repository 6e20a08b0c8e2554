use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write;

use super::{caller_subject, with_store};
use crate::tools::registry::Tool;
use crate::tools::types::{ToolContext, ToolDefinition, ToolInputSchema, ToolResult};

/// Lists every note owned by the caller
pub struct GetMyNotesTool {
    definition: ToolDefinition,
}

impl GetMyNotesTool {
    pub fn new() -> Self {
        GetMyNotesTool {
            definition: ToolDefinition {
                name: "get_my_notes".to_string(),
                description: "Get all notes for a user".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties: HashMap::new(),
                    required: vec![],
                },
            },
        }
    }
}

impl Default for GetMyNotesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetMyNotesTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, _params: Value, context: &ToolContext) -> ToolResult {
        let user_id = match caller_subject(context) {
            Ok(user_id) => user_id,
            Err(result) => return result,
        };

        let lookup_id = user_id.clone();
        let notes = match with_store(&context.db, move |db| db.list_notes(&lookup_id)).await {
            Ok(notes) => notes,
            Err(e) => {
                log::error!("[TOOLS] get_my_notes failed for {}: {}", user_id, e);
                return ToolResult::error(format!("Error retrieving notes: {}", e));
            }
        };

        if notes.is_empty() {
            return ToolResult::success("no notes found");
        }

        let mut result = String::from("Your notes:\n");
        for note in &notes {
            let _ = writeln!(result, "{}: {}", note.id, note.content);
        }

        ToolResult::success(result)
    }
}
