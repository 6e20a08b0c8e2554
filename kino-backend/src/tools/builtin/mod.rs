mod add_note;
mod delete_note;
mod get_my_notes;

pub use add_note::AddNoteTool;
pub use delete_note::DeleteNoteTool;
pub use get_my_notes::GetMyNotesTool;

use std::sync::Arc;

use crate::db::{Database, StoreError};
use crate::tools::types::{ToolContext, ToolResult};

pub const AUTH_REQUIRED: &str = "Authentication required. Please authenticate first.";
pub const MISSING_USER_ID: &str = "Invalid token: missing user ID";

/// The caller's subject id, or the result to hand back instead
fn caller_subject(context: &ToolContext) -> Result<String, ToolResult> {
    let auth = context
        .auth
        .as_ref()
        .ok_or_else(|| ToolResult::error(AUTH_REQUIRED))?;

    auth.subject()
        .map(str::to_string)
        .ok_or_else(|| ToolResult::error(MISSING_USER_ID))
}

/// Run a store call on the blocking pool so SQLite never stalls the executor
async fn with_store<T, F>(db: &Arc<Database>, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}
