//! JWT verification against the issuer's published key set

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::{Map, Value};
use std::time::Duration;

use super::{AuthError, JwksCache};
use crate::config::AuthConfig;

/// Clock skew tolerance for `exp`/`nbf`
const LEEWAY_SECS: u64 = 60;

/// A bearer token whose signature, issuer, audience and expiry have been
/// checked. Only `TokenVerifier::verify` creates one outside of tests.
#[derive(Debug, Clone)]
pub struct VerifiedToken(String);

impl VerifiedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn assume_verified(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

pub struct TokenVerifier {
    config: AuthConfig,
    jwks: JwksCache,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig, jwks_cache_ttl: Duration) -> Self {
        let jwks = JwksCache::new(config.jwks_uri.clone(), jwks_cache_ttl);
        Self::with_cache(config, jwks)
    }

    #[cfg(test)]
    pub fn with_key_set(config: AuthConfig, keys: jsonwebtoken::jwk::JwkSet) -> Self {
        let jwks = JwksCache::with_keys(config.jwks_uri.clone(), Duration::from_secs(300), keys);
        Self::with_cache(config, jwks)
    }

    fn with_cache(config: AuthConfig, jwks: JwksCache) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = LEEWAY_SECS;

        Self {
            config,
            jwks,
            validation,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != self.config.algorithm {
            return Err(AuthError::Invalid(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let key = self.jwks.decoding_key(header.kid.as_deref()).await?;

        decode::<Map<String, Value>>(token, &key, &self.validation).map_err(|e| {
            let description = match e.kind() {
                ErrorKind::ExpiredSignature => "token has expired".to_string(),
                ErrorKind::ImmatureSignature => "token is not valid yet".to_string(),
                ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                ErrorKind::InvalidIssuer => "issuer mismatch".to_string(),
                ErrorKind::InvalidAudience => "audience mismatch".to_string(),
                ErrorKind::MissingRequiredClaim(claim) => format!("missing claim {}", claim),
                _ => e.to_string(),
            };
            AuthError::Invalid(description)
        })?;

        Ok(VerifiedToken(token.to_string()))
    }
}
