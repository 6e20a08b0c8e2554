use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::{caller_subject, with_store};
use crate::db::StoreError;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult,
};

pub struct AddNoteTool {
    definition: ToolDefinition,
}

impl AddNoteTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();

        properties.insert(
            "content".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Text of the note. Leading and trailing whitespace is removed."
                    .to_string(),
            },
        );

        AddNoteTool {
            definition: ToolDefinition {
                name: "add_note".to_string(),
                description: "Add a note for a user".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["content".to_string()],
                },
            },
        }
    }
}

impl Default for AddNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AddNoteTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let user_id = match caller_subject(context) {
            Ok(user_id) => user_id,
            Err(result) => return result,
        };

        // A missing or non-string argument counts as empty
        let content = params
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        if content.is_empty() {
            return ToolResult::error("Note content cannot be empty");
        }

        let owner = user_id.clone();
        match with_store(&context.db, move |db| db.create_note(&owner, &content)).await {
            Ok(note) => {
                log::info!("[TOOLS] Added note {} for {}", note.id, user_id);
                ToolResult::success(format!("added note: {}", note.content))
            }
            Err(StoreError::Validation(msg)) => {
                ToolResult::error(format!("Validation error: {}", msg))
            }
            Err(e) => {
                log::error!("[TOOLS] add_note failed for {}: {}", user_id, e);
                ToolResult::error(format!("Error creating note: {}", e))
            }
        }
    }
}
