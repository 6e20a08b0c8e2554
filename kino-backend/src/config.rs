use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Issuer base URL of the Stytch project (e.g. "https://acme.customers.stytch.com").
    /// Also used to derive the JWKS URI and the authorize/token endpoints.
    pub const STYTCH_DOMAIN: &str = "STYTCH_DOMAIN";
    /// Stytch project id; tokens must carry it as their audience.
    pub const STYTCH_PROJECT_ID: &str = "STYTCH_PROJECT_ID";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const DB_POOL_SIZE: &str = "DB_POOL_SIZE";
    /// How long a fetched key set is trusted before it is fetched again.
    pub const JWKS_CACHE_TTL_SECS: &str = "JWKS_CACHE_TTL_SECS";
}

/// Default values
pub mod defaults {
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8000;
    pub const DATABASE_URL: &str = "./database.db";
    pub const DB_POOL_SIZE: u32 = 8;
    pub const JWKS_CACHE_TTL_SECS: u64 = 300;
    pub const JWKS_PATH: &str = "/.well-known/jwks.json";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Settings the bearer token verifier is built from.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwks_uri: String,
    pub issuer: String,
    pub algorithm: Algorithm,
    pub audience: String,
}

impl AuthConfig {
    /// Derive the verifier settings from a Stytch domain and project id.
    pub fn for_stytch(domain: &str, project_id: &str) -> Self {
        let issuer = domain.trim_end_matches('/').to_string();
        Self {
            jwks_uri: format!("{}{}", issuer, defaults::JWKS_PATH),
            issuer,
            algorithm: Algorithm::RS256,
            audience: project_id.to_string(),
        }
    }

    pub fn authorization_endpoint(&self) -> String {
        format!("{}/authorize", self.issuer)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/token", self.issuer)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub jwks_cache_ttl: Duration,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails when the Stytch settings are missing: without an issuer and
    /// audience there is nothing to verify tokens against, and the server
    /// must not start in a mode that accepts any token.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = required(&lookup, env_vars::STYTCH_DOMAIN)?;
        let project_id = required(&lookup, env_vars::STYTCH_PROJECT_ID)?;

        let pool_size = parsed(&lookup, env_vars::DB_POOL_SIZE, defaults::DB_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: env_vars::DB_POOL_SIZE,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: lookup(env_vars::HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port: parsed(&lookup, env_vars::PORT, defaults::PORT)?,
            database_url: lookup(env_vars::DATABASE_URL)
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            db_pool_size: pool_size,
            jwks_cache_ttl: Duration::from_secs(parsed(
                &lookup,
                env_vars::JWKS_CACHE_TTL_SECS,
                defaults::JWKS_CACHE_TTL_SECS,
            )?),
            auth: AuthConfig::for_stytch(&domain, &project_id),
        })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
