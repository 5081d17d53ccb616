//! Server configuration loaded from environment variables.
//!
//! Reading goes through [`mockable::Env`] so parsing can be tested without
//! touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use complaints_core::types::Barcode;
use mockable::{DefaultEnv, Env};

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_HOURS, MAX_EXPIRY_HOURS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {name}")]
    Missing { name: &'static str },

    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL. `None` selects the in-process cache.
    pub redis_url: Option<String>,
    /// TTL applied to every cached read.
    pub ttl_secs: u64,
    /// Upper bound on a single Redis call, pool checkout included.
    pub io_timeout_ms: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

/// Credentials for the admin seeded at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub barcode: Barcode,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("barcode", &self.barcode)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub admin_bootstrap: Option<AdminBootstrap>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `DATABASE_URL`                  | **required**            |
    /// | `DATABASE_MAX_CONNECTIONS`      | `20`                    |
    /// | `DATABASE_ACQUIRE_TIMEOUT_SECS` | `5`                     |
    /// | `REDIS_URL`                     | unset (memory cache)    |
    /// | `CACHE_TTL_SECS`                | `300`                   |
    /// | `CACHE_IO_TIMEOUT_MS`           | `500`                   |
    /// | `JWT_SECRET`                    | **required**            |
    /// | `JWT_EXPIRY_HOURS`              | `24` (max `8760`)       |
    /// | `ADMIN_BOOTSTRAP_BARCODE`       | unset                   |
    /// | `ADMIN_BOOTSTRAP_PASSWORD`      | unset                   |
    /// | `LOG_FORMAT`                    | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(&DefaultEnv::new())
    }

    pub fn from_env_with<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let host = env.string("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(env, "PORT", 3000u16, "a port number")?;

        let cors_origins: Vec<String> = env
            .string("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(env, "REQUEST_TIMEOUT_SECS", 30u64, "seconds")?;
        let shutdown_timeout_secs = parse_or(env, "SHUTDOWN_TIMEOUT_SECS", 30u64, "seconds")?;

        let database = DatabaseConfig {
            url: required(env, "DATABASE_URL")?,
            max_connections: parse_or(env, "DATABASE_MAX_CONNECTIONS", 20u32, "a positive integer")?,
            acquire_timeout_secs: parse_or(env, "DATABASE_ACQUIRE_TIMEOUT_SECS", 5u64, "seconds")?,
        };

        let cache = CacheConfig {
            redis_url: non_empty(env, "REDIS_URL"),
            ttl_secs: parse_or(env, "CACHE_TTL_SECS", 300u64, "seconds")?,
            io_timeout_ms: parse_or(env, "CACHE_IO_TIMEOUT_MS", 500u64, "milliseconds")?,
        };

        let jwt = JwtConfig {
            secret: required(env, "JWT_SECRET")?,
            expiry_hours: parse_or(env, "JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS, "hours")?,
        };
        if !(1..=MAX_EXPIRY_HOURS).contains(&jwt.expiry_hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRY_HOURS",
                value: jwt.expiry_hours.to_string(),
                expected: "between 1 and 8760 hours",
            });
        }

        let admin_bootstrap = admin_bootstrap(env)?;

        let log_format = match non_empty(env, "LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                    expected: "pretty|json",
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database,
            cache,
            jwt,
            admin_bootstrap,
            log_format,
        })
    }
}

fn non_empty<E: Env>(env: &E, name: &'static str) -> Option<String> {
    env.string(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    non_empty(env, name).ok_or(ConfigError::Missing { name })
}

fn parse_or<E: Env, T: FromStr>(
    env: &E,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match non_empty(env, name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
    }
}

/// Both variables or neither.
fn admin_bootstrap<E: Env>(env: &E) -> Result<Option<AdminBootstrap>, ConfigError> {
    let barcode = non_empty(env, "ADMIN_BOOTSTRAP_BARCODE");
    let password = env
        .string("ADMIN_BOOTSTRAP_PASSWORD")
        .filter(|p| !p.is_empty());
    match (barcode, password) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::Missing {
            name: "ADMIN_BOOTSTRAP_PASSWORD",
        }),
        (None, Some(_)) => Err(ConfigError::Missing {
            name: "ADMIN_BOOTSTRAP_BARCODE",
        }),
        (Some(raw), Some(password)) => {
            let barcode = raw
                .parse::<Barcode>()
                .ok()
                .filter(|b| *b > 0)
                .ok_or(ConfigError::Invalid {
                    name: "ADMIN_BOOTSTRAP_BARCODE",
                    value: raw,
                    expected: "a positive integer",
                })?;
            Ok(Some(AdminBootstrap { barcode, password }))
        }
    }
}
