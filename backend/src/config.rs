//! Environment-driven application configuration.
//!
//! Every setting is read through [`mockable::Env`] so the loader can be
//! exercised with a `MockEnv` in unit tests and with scoped process
//! variables in integration tests.

use std::path::PathBuf;
use std::str::FromStr;

use mockable::Env;
use tracing::debug;
use zeroize::Zeroizing;

const JWT_SECRET_ENV: &str = "JWT_SECRET";
const JWT_SECRET_MIN_LEN: usize = 16;
const BOOL_EXPECTED: &str = "true|false|1|0|yes|no";

/// Default listener port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    /// Lower-case name as written in `ENVIRONMENT`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(()),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The token secret is too short to key digests safely.
    #[error("JWT_SECRET must be at least {min_len} characters")]
    SecretTooShort { min_len: usize },
}

/// M-Pesa gateway credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MpesaConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub passkey: Option<String>,
    pub shortcode: Option<String>,
}

/// Google OAuth client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
}

/// Outbound mail relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Cache connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub password: Option<String>,
}

/// Request throttling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_secs: u64,
}

/// Logging and observability toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub enable_metrics: bool,
    pub enable_tracing: bool,
    pub metrics_port: u16,
}

/// Periodic database backups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub enabled: bool,
    pub interval_hours: u64,
    pub path: PathBuf,
}

/// Fully validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: Zeroizing<String>,
    pub database_url: String,
    pub environment: Environment,
    pub port: u16,
    pub mpesa: MpesaConfig,
    pub google: GoogleConfig,
    pub smtp: SmtpConfig,
    pub redis: RedisConfig,
    pub max_file_size: u64,
    pub upload_path: PathBuf,
    pub rate_limit: RateLimitConfig,
    pub observability: ObservabilityConfig,
    pub backup: BackupConfig,
}

impl AppConfig {
    /// Load and validate configuration from `env`.
    ///
    /// # Examples
    /// ```
    /// use mockable::MockEnv;
    /// use vaultke::config::{AppConfig, Environment};
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "JWT_SECRET" => Some("a-secret-of-sixteen+".to_owned()),
    ///     "DATABASE_URL" => Some(":memory:".to_owned()),
    ///     "ENVIRONMENT" => Some("test".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let config = AppConfig::from_env(&env).expect("valid configuration");
    /// assert_eq!(config.environment, Environment::Test);
    /// assert_eq!(config.port, 8080);
    /// ```
    ///
    /// # Errors
    /// Missing required variables, unparsable values, a short secret, or
    /// absent M-Pesa credentials in production.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let jwt_secret = Zeroizing::new(required(env, JWT_SECRET_ENV)?);
        if jwt_secret.chars().count() < JWT_SECRET_MIN_LEN {
            return Err(ConfigError::SecretTooShort {
                min_len: JWT_SECRET_MIN_LEN,
            });
        }
        let database_url = required(env, "DATABASE_URL")?;
        let environment = environment(env)?;

        let mpesa = MpesaConfig {
            consumer_key: optional(env, "MPESA_CONSUMER_KEY"),
            consumer_secret: optional(env, "MPESA_CONSUMER_SECRET"),
            passkey: optional(env, "MPESA_PASSKEY"),
            shortcode: optional(env, "MPESA_SHORTCODE"),
        };
        if environment.is_production() {
            if mpesa.consumer_key.is_none() {
                return Err(ConfigError::MissingEnv {
                    name: "MPESA_CONSUMER_KEY",
                });
            }
            if mpesa.consumer_secret.is_none() {
                return Err(ConfigError::MissingEnv {
                    name: "MPESA_CONSUMER_SECRET",
                });
            }
        }

        let config = Self {
            jwt_secret,
            database_url,
            environment,
            port: parsed(env, "PORT", DEFAULT_PORT, "a port number")?,
            mpesa,
            google: GoogleConfig {
                client_id: optional(env, "GOOGLE_CLIENT_ID"),
                client_secret: optional(env, "GOOGLE_CLIENT_SECRET"),
                redirect_url: optional(env, "GOOGLE_REDIRECT_URL"),
            },
            smtp: SmtpConfig {
                host: optional(env, "SMTP_HOST"),
                port: parsed(env, "SMTP_PORT", 587, "a port number")?,
                username: optional(env, "SMTP_USERNAME"),
                password: optional(env, "SMTP_PASSWORD"),
            },
            redis: RedisConfig {
                url: optional(env, "REDIS_URL"),
                password: optional(env, "REDIS_PASSWORD"),
            },
            max_file_size: parsed(env, "MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE, "a byte count")?,
            upload_path: path(env, "UPLOAD_PATH", "./uploads"),
            rate_limit: RateLimitConfig {
                requests: parsed(env, "RATE_LIMIT_REQUESTS", 100, "a request count")?,
                window_secs: parsed(env, "RATE_LIMIT_WINDOW", 60, "a number of seconds")?,
            },
            observability: ObservabilityConfig {
                log_level: optional(env, "LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
                log_file: optional(env, "LOG_FILE").map(PathBuf::from),
                enable_metrics: flag(env, "ENABLE_METRICS", false)?,
                enable_tracing: flag(env, "ENABLE_TRACING", false)?,
                metrics_port: parsed(env, "METRICS_PORT", 9090, "a port number")?,
            },
            backup: BackupConfig {
                enabled: flag(env, "BACKUP_ENABLED", false)?,
                interval_hours: parsed(env, "BACKUP_INTERVAL", 24, "a number of hours")?,
                path: path(env, "BACKUP_PATH", "./backups"),
            },
        };
        debug!(
            environment = config.environment.as_str(),
            port = config.port,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn optional<E: Env>(env: &E, name: &'static str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    optional(env, name).ok_or(ConfigError::MissingEnv { name })
}

fn environment<E: Env>(env: &E) -> Result<Environment, ConfigError> {
    let value = required(env, "ENVIRONMENT")?;
    value
        .to_ascii_lowercase()
        .parse()
        .map_err(|()| ConfigError::InvalidEnv {
            name: "ENVIRONMENT",
            value,
            expected: "development|production|test",
        })
}

fn parsed<E: Env, T: FromStr>(
    env: &E,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match optional(env, name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
    }
}

fn flag<E: Env>(env: &E, name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(env, name) {
        None => Ok(default),
        Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn path<E: Env>(env: &E, name: &'static str, default: &str) -> PathBuf {
    PathBuf::from(optional(env, name).unwrap_or_else(|| default.to_owned()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
