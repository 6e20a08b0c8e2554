//! Shared fixtures for unit tests: signed tokens, a seeded verifier and
//! throwaway databases.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

use crate::auth::{AuthContext, TokenVerifier, VerifiedToken};
use crate::config::{AuthConfig, Config};
use crate::db::Database;
use crate::tools::create_default_registry;
use crate::AppState;

pub const TEST_ISSUER: &str = "https://auth.example.com";
pub const TEST_AUDIENCE: &str = "project-test-0000";
pub const TEST_KID: &str = "rsa-test-key";

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/rsa_private.pem");
pub const OTHER_PRIVATE_KEY: &str = include_str!("../fixtures/other_private.pem");
const TEST_PUBLIC_JWK: &str = include_str!("../fixtures/rsa_public.jwk.json");

pub fn auth_config() -> AuthConfig {
    AuthConfig::for_stytch(TEST_ISSUER, TEST_AUDIENCE)
}

/// Key set holding only the fixture public key
pub fn test_key_set() -> JwkSet {
    let jwk: Value = serde_json::from_str(TEST_PUBLIC_JWK).unwrap();
    serde_json::from_value(json!({ "keys": [jwk] })).unwrap()
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::with_key_set(auth_config(), test_key_set())
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Valid claims for `sub`, expiring in an hour
pub fn claims_for(sub: &str) -> Value {
    let now = now_secs();
    json!({
        "sub": sub,
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    })
}

/// Sign with the fixture key
pub fn sign(claims: &Value) -> String {
    sign_with(claims, TEST_PRIVATE_KEY, Some(TEST_KID))
}

pub fn sign_with(claims: &Value, private_pem: &str, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Structurally valid JWT with a bogus signature
pub fn unsigned_token(claims: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let header = json!({"alg": "RS256", "typ": "JWT", "kid": TEST_KID});
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode("sig"),
    )
}

pub fn auth_for(sub: &str) -> AuthContext {
    AuthContext::from_verified(VerifiedToken::assume_verified(sign(&claims_for(sub))))
}

pub fn auth_without_subject() -> AuthContext {
    let mut claims = claims_for("ignored");
    claims.as_object_mut().unwrap().remove("sub");
    AuthContext::from_verified(VerifiedToken::assume_verified(sign(&claims)))
}

/// Fresh database in a temp dir; keep the `TempDir` alive for the test
pub fn temp_db() -> (TempDir, Arc<Database>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let db = Database::new(path.to_str().unwrap(), 2).unwrap();
    (dir, Arc::new(db))
}

pub fn test_state() -> (TempDir, AppState) {
    let (dir, db) = temp_db();
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: dir.path().join("notes.db").display().to_string(),
        db_pool_size: 2,
        jwks_cache_ttl: std::time::Duration::from_secs(300),
        auth: auth_config(),
    };

    let state = AppState {
        db,
        config,
        verifier: Arc::new(test_verifier()),
        tool_registry: Arc::new(create_default_registry()),
        started_at: Instant::now(),
    };
    (dir, state)
}
