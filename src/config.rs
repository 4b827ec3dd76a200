use std::{env, time::Duration};

use crate::error::ConfigError;

/// Fallback signing secret used when running locally without `ACCESS_TOKEN_SECRET`.
const LOCAL_TOKEN_SECRET: &str = "friendkit-local-development-secret";

/// AppConfig
///
/// Holds the application's entire configuration state. It is loaded once at startup,
/// never mutated afterwards, and pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls which secrets are mandatory.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Secret used to sign and verify identity tokens (HS256).
    pub jwt_secret: String,
    // TCP port the HTTP server binds to.
    pub port: u16,
    // Upper bound of pooled Postgres connections.
    pub db_max_connections: u32,
    // How long a request may wait for a pooled connection.
    pub db_acquire_timeout: Duration,
    // Optional whole-request timeout. `None` means requests are never cut short.
    pub request_timeout: Option<Duration>,
}

/// Env
///
/// Defines the runtime context: a permissive local mode with development fallbacks,
/// and a production mode that refuses to start without its secrets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for tests. No database URL, so the
    /// in-memory store is selected.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_TOKEN_SECRET.to_string(),
            port: 5000,
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(30),
            request_timeout: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the environment and fails fast when a value that
    /// the current environment requires is missing or malformed.
    ///
    /// Production requires `ACCESS_TOKEN_SECRET` and `DATABASE_URL`. Local mode falls
    /// back to a development secret and, without `DATABASE_URL`, to the in-memory store.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match (env, env::var("ACCESS_TOKEN_SECRET")) {
            (_, Ok(secret)) if !secret.is_empty() => secret,
            (Env::Production, _) => return Err(ConfigError::Missing("ACCESS_TOKEN_SECRET")),
            (Env::Local, _) => LOCAL_TOKEN_SECRET.to_string(),
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if env == Env::Production && db_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            env,
            db_url,
            jwt_secret,
            port: parse_var("PORT")?.unwrap_or(5000),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(5),
            db_acquire_timeout: Duration::from_secs(
                parse_var("DB_ACQUIRE_TIMEOUT_SECS")?.unwrap_or(30),
            ),
            request_timeout: parse_var::<u64>("REQUEST_TIMEOUT_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}

/// Parses an optional numeric variable. Unset or empty yields `Ok(None)`.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(None),
    }
}
