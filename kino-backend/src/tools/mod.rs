pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::{create_default_registry, ToolRegistry};
pub use types::ToolContext;
