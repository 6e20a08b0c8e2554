//! Tool transport: JSON-RPC 2.0 over `POST /mcp`

pub mod protocol;
pub mod server;

pub use server::config;
