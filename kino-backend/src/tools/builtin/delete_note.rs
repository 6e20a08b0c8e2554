use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::{caller_subject, with_store};
use crate::db::StoreError;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult,
};

/// Removes one of the caller's notes by id
pub struct DeleteNoteTool {
    definition: ToolDefinition,
}

impl DeleteNoteTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();

        properties.insert(
            "note_id".to_string(),
            PropertySchema {
                schema_type: "integer".to_string(),
                description: "Id of the note, as shown by get_my_notes.".to_string(),
            },
        );

        DeleteNoteTool {
            definition: ToolDefinition {
                name: "delete_note".to_string(),
                description: "Delete one of your notes".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["note_id".to_string()],
                },
            },
        }
    }
}

impl Default for DeleteNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DeleteNoteTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let user_id = match caller_subject(context) {
            Ok(user_id) => user_id,
            Err(result) => return result,
        };

        let note_id = match params.get("note_id").and_then(Value::as_i64) {
            Some(id) => id,
            None => return ToolResult::error("Validation error: note_id must be an integer"),
        };

        let owner = user_id.clone();
        match with_store(&context.db, move |db| db.delete_note(&owner, note_id)).await {
            Ok(true) => {
                log::info!("[TOOLS] Deleted note {} for {}", note_id, user_id);
                ToolResult::success(format!("deleted note {}", note_id))
            }
            Ok(false) => ToolResult::error(format!("note {} not found", note_id)),
            Err(StoreError::Validation(msg)) => {
                ToolResult::error(format!("Validation error: {}", msg))
            }
            Err(e) => {
                log::error!("[TOOLS] delete_note failed for {}: {}", user_id, e);
                ToolResult::error(format!("Error deleting note: {}", e))
            }
        }
    }
}
