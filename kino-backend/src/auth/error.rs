use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed token")]
    Malformed,
    #[error("missing user ID")]
    MissingSubject,
    #[error("no signing key found for kid {}", .0.as_deref().unwrap_or("none"))]
    UnknownKey(Option<String>),
    #[error("invalid token: {0}")]
    Invalid(String),
    /// The issuer's key set could not be fetched or parsed
    #[error("signing keys unavailable: {0}")]
    Jwks(String),
}

impl AuthError {
    /// Key set failures are on our side, everything else is the caller's token.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Jwks(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// `WWW-Authenticate` value per RFC 6750, pointing the client at the
    /// protected resource metadata so it can discover the issuer.
    pub fn www_authenticate(&self, resource_metadata_url: &str) -> String {
        let mut parts = vec![format!("resource_metadata=\"{}\"", resource_metadata_url)];

        match self {
            // No error code when the request carried no credentials at all
            AuthError::MissingToken => {}
            AuthError::Jwks(_) => {
                parts.push("error=\"temporarily_unavailable\"".to_string());
            }
            other => {
                parts.push("error=\"invalid_token\"".to_string());
                parts.push(format!(
                    "error_description=\"{}\"",
                    other.to_string().replace('"', "'")
                ));
            }
        }

        format!("Bearer {}", parts.join(", "))
    }
}
