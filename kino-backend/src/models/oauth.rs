//! OAuth discovery documents served under `/.well-known/`.

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Scopes advertised to clients
pub const SUPPORTED_SCOPES: [&str; 2] = ["read", "write"];

/// Protected resource metadata (RFC 9728).
///
/// Tells an unauthenticated client which authorization server issues tokens
/// for this server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResourceMetadata {
    /// Base URL of this server, without a trailing slash
    pub resource: String,
    pub authorization_servers: Vec<String>,
    pub scopes_supported: Vec<String>,
    pub bearer_methods_supported: Vec<String>,
}

impl ProtectedResourceMetadata {
    pub fn new(resource: &str, auth: &AuthConfig) -> Self {
        Self {
            resource: resource.trim_end_matches('/').to_string(),
            authorization_servers: vec![auth.issuer.clone()],
            scopes_supported: SUPPORTED_SCOPES.iter().map(|s| s.to_string()).collect(),
            bearer_methods_supported: vec!["header".to_string(), "body".to_string()],
        }
    }
}

/// Authorization server metadata (RFC 8414) describing the external issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationServerMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub response_types_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub code_challenge_methods_supported: Vec<String>,
}

impl AuthorizationServerMetadata {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            issuer: format!("{}/", auth.issuer),
            authorization_endpoint: auth.authorization_endpoint(),
            token_endpoint: auth.token_endpoint(),
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            token_endpoint_auth_methods_supported: vec!["client_secret_post".to_string()],
            code_challenge_methods_supported: vec!["S256".to_string()],
        }
    }
}
