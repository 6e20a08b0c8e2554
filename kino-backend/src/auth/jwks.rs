//! JWKS (JSON Web Key Set) fetching and caching

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::AuthError;

/// Never contact the issuer more often than this, whether or not the last
/// attempt succeeded. Stops a flood of tokens with made-up `kid`s, or an
/// issuer outage, from turning every request into an outbound fetch.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

#[derive(Default)]
struct KeyState {
    cached: Option<CachedKeys>,
    /// Start of the most recent fetch, successful or not
    last_attempt: Option<Instant>,
}

/// Key set for one issuer, fetched lazily and kept for `ttl`
pub struct JwksCache {
    uri: String,
    ttl: Duration,
    min_refresh_interval: Duration,
    client: reqwest::Client,
    state: RwLock<KeyState>,
}

impl JwksCache {
    pub fn new(uri: impl Into<String>, ttl: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            uri: uri.into(),
            ttl,
            min_refresh_interval: MIN_REFRESH_INTERVAL,
            client,
            state: RwLock::new(KeyState::default()),
        }
    }

    /// Cache pre-loaded with `keys`, treated as freshly fetched
    #[cfg(test)]
    pub fn with_keys(uri: impl Into<String>, ttl: Duration, keys: JwkSet) -> Self {
        let mut cache = Self::new(uri, ttl);
        let now = Instant::now();
        cache.state = RwLock::new(KeyState {
            cached: Some(CachedKeys {
                keys,
                fetched_at: now,
            }),
            last_attempt: Some(now),
        });
        cache
    }

    /// Resolve the decoding key for a token's `kid`.
    ///
    /// A missing or unknown `kid` triggers one refresh so rotated keys are
    /// picked up without a restart.
    pub async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        {
            let guard = self.state.read().await;
            if let Some(cached) = guard.cached.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    if let Some(jwk) = select_key(&cached.keys, kid) {
                        return to_decoding_key(jwk);
                    }
                }
            }
        }

        let keys = self.refresh().await?;
        match select_key(&keys, kid) {
            Some(jwk) => to_decoding_key(jwk),
            None => Err(AuthError::UnknownKey(kid.map(String::from))),
        }
    }

    /// Fetch a new key set, unless the issuer was contacted too recently.
    /// Falls back to the last good key set when the fetch fails.
    async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let mut guard = self.state.write().await;

        // Covers both another request refreshing while we waited for the
        // lock and a recent failed attempt
        let recently_attempted = guard
            .last_attempt
            .is_some_and(|at| at.elapsed() < self.min_refresh_interval);
        if recently_attempted {
            return match guard.cached.as_ref() {
                Some(cached) => Ok(cached.keys.clone()),
                None => Err(AuthError::Jwks("issuer recently unreachable".to_string())),
            };
        }

        guard.last_attempt = Some(Instant::now());

        match self.fetch().await {
            Ok(keys) => {
                log::info!("[AUTH] Fetched {} signing key(s) from {}", keys.keys.len(), self.uri);
                guard.cached = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(keys)
            }
            Err(e) => match guard.cached.as_ref() {
                Some(cached) => {
                    log::warn!("[AUTH] Keeping stale signing keys for {}: {}", self.uri, e);
                    Ok(cached.keys.clone())
                }
                None => Err(e),
            },
        }
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        self.client
            .get(&self.uri)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                log::error!("[AUTH] JWKS request to {} failed: {}", self.uri, e);
                AuthError::Jwks(format!("request failed: {}", e))
            })?
            .json::<JwkSet>()
            .await
            .map_err(|e| {
                log::error!("[AUTH] Invalid JWKS document from {}: {}", self.uri, e);
                AuthError::Jwks(format!("invalid key set: {}", e))
            })
    }
}

/// Pick the key named by `kid`; a token without `kid` is only accepted when
/// the set holds exactly one key.
fn select_key<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => keys.find(kid),
        None if keys.keys.len() == 1 => keys.keys.first(),
        None => None,
    }
}

fn to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_jwk(jwk).map_err(|e| AuthError::Jwks(format!("unusable key: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Local issuer whose JWKS endpoint always answers 500; returns its URI
    /// and a count of requests it has seen
    fn start_failing_issuer() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = HttpServer::new(move || {
            let counter = Arc::clone(&counter);
            App::new().route(
                "/.well-known/jwks.json",
                web::get().to(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { HttpResponse::InternalServerError().finish() }
                }),
            )
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .unwrap()
        .run();
        actix_web::rt::spawn(server);

        (format!("http://127.0.0.1:{}/.well-known/jwks.json", port), hits)
    }

    // Unroutable address; any fetch attempt fails fast
    const DEAD_URI: &str = "http://127.0.0.1:9/.well-known/jwks.json";

    #[tokio::test]
    async fn test_known_kid_served_from_cache() {
        let cache = JwksCache::with_keys(
            DEAD_URI,
            Duration::from_secs(300),
            test_support::test_key_set(),
        );

        assert!(cache.decoding_key(Some(test_support::TEST_KID)).await.is_ok());
        // Single key set also serves tokens without a kid
        assert!(cache.decoding_key(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_kid_within_refresh_interval() {
        let cache = JwksCache::with_keys(
            DEAD_URI,
            Duration::from_secs(300),
            test_support::test_key_set(),
        );

        let err = cache.decoding_key(Some("rotated-key")).await.err();
        assert_eq!(err, Some(AuthError::UnknownKey(Some("rotated-key".to_string()))));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_jwks_error() {
        let cache = JwksCache::new(DEAD_URI, Duration::from_secs(300));

        let err = cache.decoding_key(Some(test_support::TEST_KID)).await.err();
        assert!(matches!(err, Some(AuthError::Jwks(_))));
    }

    #[actix_web::test]
    async fn test_failing_issuer_is_contacted_once_per_interval() {
        let (uri, hits) = start_failing_issuer();
        let cache = JwksCache::new(uri, Duration::from_secs(300));

        for _ in 0..20 {
            let err = cache.decoding_key(Some("k")).await.err();
            assert!(matches!(err, Some(AuthError::Jwks(_))));
        }

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_stale_keys_served_when_refresh_fails() {
        let (uri, hits) = start_failing_issuer();
        let mut cache = JwksCache::with_keys(uri, Duration::ZERO, test_support::test_key_set());
        cache.min_refresh_interval = Duration::ZERO;

        assert!(cache.decoding_key(Some(test_support::TEST_KID)).await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
