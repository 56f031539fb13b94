//! Back Office API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. The database user and password have no default: startup fails
//! without them.
//!
//! | Variable               | Default                 |
//! |------------------------|-------------------------|
//! | `DB_USER`              | required                |
//! | `DB_PASS`              | required                |
//! | `DB_HOST`              | `localhost`             |
//! | `DB_PORT`              | `5432`                  |
//! | `DB_NAME`              | `postgres`              |
//! | `HTTP_PORT`            | `8080`                  |
//! | `CORS_ORIGIN`          | `http://localhost:3000` |
//! | `REQUEST_TIMEOUT_SECS` | `90`                    |
//! | `DB_MAX_CONNECTIONS`   | `10`                    |
//! | `DB_MIN_CONNECTIONS`   | `5`                     |
//! | `DB_MAX_LIFETIME_SECS` | `300`                   |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use backoffice_db::DbConfig;

use crate::routes::HttpSettings;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// CORS origin and request timeout applied by the router
    pub http: HttpSettings,

    /// PostgreSQL connection and pool settings
    pub database: DbConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so it can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = required(&lookup, "DB_USER")?;
        let password = required(&lookup, "DB_PASS")?;

        let database = DbConfig::new(user, password)
            .host(lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()))
            .port(parsed(&lookup, "DB_PORT", 5432)?)
            .database(lookup("DB_NAME").unwrap_or_else(|| "postgres".to_string()))
            .max_connections(parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?)
            .min_connections(parsed(&lookup, "DB_MIN_CONNECTIONS", 5)?)
            .max_lifetime(Duration::from_secs(parsed(&lookup, "DB_MAX_LIFETIME_SECS", 300)?));

        if database.min_connections > database.max_connections {
            return Err(ConfigError::InvalidValue("DB_MIN_CONNECTIONS".to_string()));
        }

        let cors_origin = lookup("CORS_ORIGIN")
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let cors_origin = HeaderValue::from_str(&cors_origin)
            .map_err(|_| ConfigError::InvalidValue("CORS_ORIGIN".to_string()))?;

        Ok(ApiConfig {
            http_port: parsed(&lookup, "HTTP_PORT", 8080)?,
            http: HttpSettings {
                cors_origin,
                request_timeout: Duration::from_secs(parsed(&lookup, "REQUEST_TIMEOUT_SECS", 90)?),
            },
            database,
        })
    }
}

/// A required, non-empty variable.
fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

/// An optional variable parsed into `T`, or `default` when unset.
fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("DB_USER", "app"), ("DB_PASS", "secret")]))
                .unwrap();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.http.cors_origin, "http://localhost:3000");
        assert_eq!(config.http.request_timeout, Duration::from_secs(90));
        assert_eq!(config.database.user, "app");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.database, "postgres");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.database.max_lifetime, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("DB_USER", "app"),
            ("DB_PASS", "secret"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6432"),
            ("DB_NAME", "retail"),
            ("HTTP_PORT", "9000"),
            ("CORS_ORIGIN", "https://office.example.com"),
            ("DB_MAX_CONNECTIONS", "20"),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.http.cors_origin, "https://office.example.com");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6432);
        assert_eq!(config.database.database, "retail");
        assert_eq!(config.database.max_connections, 20);
    }

    #[test]
    fn test_missing_credentials() {
        let err = ApiConfig::from_lookup(lookup_from(&[("DB_PASS", "secret")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "DB_USER"));

        let err = ApiConfig::from_lookup(lookup_from(&[("DB_USER", "app"), ("DB_PASS", "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "DB_PASS"));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            ("DB_USER", "app"),
            ("DB_PASS", "secret"),
            ("DB_PORT", "five"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for DB_PORT");

        let err = ApiConfig::from_lookup(lookup_from(&[
            ("DB_USER", "app"),
            ("DB_PASS", "secret"),
            ("DB_MIN_CONNECTIONS", "50"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for DB_MIN_CONNECTIONS");
    }
}
