use super::{extract_subject, VerifiedToken};

/// Per-request authentication state, built by the transport after the token
/// has been verified and passed explicitly to each tool call.
///
/// Lives for exactly one request; never stored or shared between calls.
#[derive(Debug, Clone)]
pub struct AuthContext {
    token: VerifiedToken,
    subject: Option<String>,
}

impl AuthContext {
    pub fn from_verified(token: VerifiedToken) -> Self {
        let subject = match extract_subject(token.as_str()) {
            Ok(subject) => Some(subject),
            Err(e) => {
                log::warn!("[AUTH] Verified token has no usable subject: {}", e);
                None
            }
        };

        Self { token, subject }
    }

    #[cfg(test)]
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Stable id of the caller, `None` when the token carries no `sub`
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}
