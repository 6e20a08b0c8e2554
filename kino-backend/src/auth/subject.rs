use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use super::AuthError;

/// Read the `sub` claim from a JWT payload.
///
/// Decodes only; the signature is NOT checked here. Callers must have
/// verified the token first (see `AuthContext::from_verified`).
pub fn extract_subject(token: &str) -> Result<String, AuthError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AuthError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::Malformed)?;
    let claims: Value = serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)?;

    match claims.get("sub").and_then(Value::as_str) {
        Some(sub) if !sub.is_empty() => Ok(sub.to_string()),
        _ => Err(AuthError::MissingSubject),
    }
}
