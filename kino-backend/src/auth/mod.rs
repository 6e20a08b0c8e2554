//! Bearer token authentication
//!
//! `TokenVerifier` checks signature, issuer, audience and expiry against the
//! issuer's JWKS and hands out a `VerifiedToken`. Only a `VerifiedToken` can
//! become an `AuthContext`, so the subject extractor (which does no
//! cryptography of its own) never runs on an unchecked token.

mod context;
mod error;
mod jwks;
mod subject;
mod verifier;

pub use context::AuthContext;
pub use error::AuthError;
pub use jwks::JwksCache;
pub use subject::extract_subject;
pub use verifier::{TokenVerifier, VerifiedToken};
