use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::AuthContext;
use crate::db::Database;

/// JSON schema for a single tool argument
#[derive(Debug, Clone, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    pub required: Vec<String>,
}

/// Tool description as listed by `tools/list`
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: ToolInputSchema,
}

/// Everything a tool call may use. Built fresh by the transport for every
/// call; `auth` is `None` when no verified token accompanied the request.
#[derive(Clone)]
pub struct ToolContext {
    pub auth: Option<AuthContext>,
    pub db: Arc<Database>,
}

/// Outcome of a tool call.
///
/// Tools never fail across the protocol boundary: a failure is a result
/// whose text explains what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    pub content: String,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
        }
    }
}
