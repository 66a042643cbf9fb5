// ABOUTME: Environment-based server configuration loader
// ABOUTME: Parses ports, database, scheduling, cache, booking and HTTP settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::database::DatabaseConfig;
use super::scheduling::SchedulingConfig;
use crate::cache::CacheConfig;
use crate::constants::{booking, cache, network};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string, defaulting to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Whether this is a production deployment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Commit-path tuning for the booking transactor
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Maximum wait for one resource lock
    pub lock_timeout: Duration,
    /// Attempts before a conflict is surfaced
    pub max_attempts: u32,
    /// Base backoff between attempts
    pub retry_base_delay: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(booking::DEFAULT_LOCK_TIMEOUT_MS),
            max_attempts: booking::DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(booking::DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl BookingConfig {
    /// Load from `BOOKING_LOCK_TIMEOUT_MS`, `BOOKING_MAX_ATTEMPTS`, `BOOKING_RETRY_BASE_DELAY_MS`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparseable or zero attempt counts
    pub fn from_env() -> AppResult<Self> {
        let max_attempts: u32 = parse_env("BOOKING_MAX_ATTEMPTS", booking::DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(AppError::config("BOOKING_MAX_ATTEMPTS must be at least 1"));
        }
        Ok(Self {
            lock_timeout: Duration::from_millis(parse_env(
                "BOOKING_LOCK_TIMEOUT_MS",
                booking::DEFAULT_LOCK_TIMEOUT_MS,
            )?),
            max_attempts,
            retry_base_delay: Duration::from_millis(parse_env(
                "BOOKING_RETRY_BASE_DELAY_MS",
                booking::DEFAULT_RETRY_BASE_DELAY_MS,
            )?),
        })
    }
}

/// HTTP surface settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Comma-separated allowed origins, `*` for any
    pub cors_allowed_origins: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(network::DEFAULT_REQUEST_TIMEOUT_SECS),
            cors_allowed_origins: "*".to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Operating hours and calendar
    pub scheduling: SchedulingConfig,
    /// Catalog cache settings
    pub cache: CacheConfig,
    /// Booking commit-path settings
    pub booking: BookingConfig,
    /// HTTP settings
    pub http: HttpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: network::DEFAULT_HTTP_PORT,
            host: network::DEFAULT_HOST.to_owned(),
            environment: Environment::default(),
            database: DatabaseConfig::default(),
            scheduling: SchedulingConfig::default(),
            cache: CacheConfig::default(),
            booking: BookingConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` when any variable holds an invalid value
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        // Variables already set in the process win over the .env file
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {e}");
        }

        let config = Self {
            http_port: parse_env("HTTP_PORT", network::DEFAULT_HTTP_PORT)?,
            host: env_var_or("HOST", network::DEFAULT_HOST),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig::from_env()?,
            scheduling: SchedulingConfig::from_env()?,
            cache: CacheConfig {
                max_entries: parse_env(
                    "CATALOG_CACHE_MAX_ENTRIES",
                    cache::DEFAULT_CATALOG_MAX_ENTRIES,
                )?,
                ttl: Duration::from_secs(parse_env(
                    "CATALOG_CACHE_TTL_SECS",
                    cache::DEFAULT_CATALOG_TTL_SECS,
                )?),
                ..CacheConfig::default()
            },
            booking: BookingConfig::from_env()?,
            http: HttpConfig {
                request_timeout: Duration::from_secs(parse_env(
                    "REQUEST_TIMEOUT_SECS",
                    network::DEFAULT_REQUEST_TIMEOUT_SECS,
                )?),
                cors_allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
        };

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Courtbook Server Configuration:\n\
             - Environment: {}\n\
             - Bind: {}:{}\n\
             - Database: {}{}\n\
             - Operating hours: {:02}:00-{:02}:00 (UTC offset {})\n\
             - Holidays configured: {}\n\
             - Catalog cache: ttl={}s, max_entries={}\n\
             - Booking: lock_timeout={}ms, max_attempts={}, retry_base={}ms\n\
             - Request timeout: {}s\n\
             - CORS origins: {}",
            self.environment,
            self.host,
            self.http_port,
            self.database.url,
            if self.database.auto_migrate {
                " (auto-migrate)"
            } else {
                ""
            },
            self.scheduling.open_hour,
            self.scheduling.close_hour,
            self.scheduling.utc_offset,
            self.scheduling.holidays.len(),
            self.cache.ttl.as_secs(),
            self.cache.max_entries,
            self.booking.lock_timeout.as_millis(),
            self.booking.max_attempts,
            self.booking.retry_base_delay.as_millis(),
            self.http.request_timeout.as_secs(),
            self.http.cors_allowed_origins,
        )
    }
}

/// Get environment variable or default value
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
pub(crate) fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("whatever"),
            Environment::Development
        );
    }

    #[test]
    fn test_summary_mentions_operating_hours() {
        let summary = ServerConfig::default().summary();
        assert!(summary.contains("06:00-22:00"));
        assert!(summary.contains("8081"));
    }
}
