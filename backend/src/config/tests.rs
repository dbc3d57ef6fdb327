//! Unit tests for configuration loading.

use super::*;
use std::collections::HashMap;

use env_lock::lock_env;
use mockable::{DefaultEnv, MockEnv};
use rstest::{fixture, rstest};

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn base() -> HashMap<&'static str, String> {
    HashMap::from([
        (JWT_SECRET_ENV, "0123456789abcdef".to_owned()),
        ("DATABASE_URL", ":memory:".to_owned()),
        ("ENVIRONMENT", "development".to_owned()),
    ])
}

fn load(vars: HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
    AppConfig::from_env(&mock_env(vars))
}

#[rstest]
fn defaults_fill_optional_settings(base: HashMap<&'static str, String>) {
    let config = load(base).expect("minimal configuration loads");
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.smtp.port, 587);
    assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert_eq!(config.upload_path, PathBuf::from("./uploads"));
    assert_eq!(
        config.rate_limit,
        RateLimitConfig {
            requests: 100,
            window_secs: 60
        }
    );
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.enable_metrics);
    assert_eq!(config.observability.metrics_port, 9090);
    assert!(!config.backup.enabled);
    assert_eq!(config.backup.interval_hours, 24);
    assert_eq!(config.backup.path, PathBuf::from("./backups"));
    assert_eq!(config.mpesa, MpesaConfig::default());
}

#[rstest]
#[case(JWT_SECRET_ENV)]
#[case("DATABASE_URL")]
#[case("ENVIRONMENT")]
fn required_variables_are_enforced(
    mut base: HashMap<&'static str, String>,
    #[case] name: &'static str,
) {
    base.remove(name);
    assert_eq!(load(base).expect_err("missing"), ConfigError::MissingEnv { name });
}

#[rstest]
fn blank_required_values_count_as_missing(mut base: HashMap<&'static str, String>) {
    base.insert("DATABASE_URL", "   ".to_owned());
    assert_eq!(
        load(base).expect_err("blank"),
        ConfigError::MissingEnv {
            name: "DATABASE_URL"
        }
    );
}

#[rstest]
fn short_secrets_are_rejected(mut base: HashMap<&'static str, String>) {
    base.insert(JWT_SECRET_ENV, "too-short".to_owned());
    assert_eq!(
        load(base).expect_err("short"),
        ConfigError::SecretTooShort { min_len: 16 }
    );
}

#[rstest]
#[case("ENVIRONMENT", "staging")]
#[case("PORT", "eighty")]
#[case("SMTP_PORT", "70000")]
#[case("MAX_FILE_SIZE", "-1")]
#[case("RATE_LIMIT_WINDOW", "1m")]
#[case("ENABLE_METRICS", "sometimes")]
#[case("BACKUP_INTERVAL", "daily")]
fn unparsable_values_name_the_variable(
    mut base: HashMap<&'static str, String>,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    base.insert(name, value.to_owned());
    let err = load(base).expect_err("invalid");
    assert!(
        matches!(&err, ConfigError::InvalidEnv { name: reported, value: seen, .. } if *reported == name && seen == value),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains(name));
}

#[rstest]
fn overrides_are_applied(mut base: HashMap<&'static str, String>) {
    base.extend([
        ("PORT", "9000".to_owned()),
        ("ENABLE_TRACING", "yes".to_owned()),
        ("BACKUP_ENABLED", "1".to_owned()),
        ("LOG_LEVEL", "debug".to_owned()),
        ("LOG_FILE", "/var/log/vaultke.log".to_owned()),
        ("REDIS_URL", "redis://localhost:6379".to_owned()),
    ]);
    let config = load(base).expect("overrides load");
    assert_eq!(config.port, 9000);
    assert!(config.observability.enable_tracing);
    assert!(config.backup.enabled);
    assert_eq!(config.observability.log_level, "debug");
    assert_eq!(
        config.observability.log_file,
        Some(PathBuf::from("/var/log/vaultke.log"))
    );
    assert_eq!(config.redis.url.as_deref(), Some("redis://localhost:6379"));
}

#[rstest]
#[case(None, None, Some("MPESA_CONSUMER_KEY"))]
#[case(Some("key"), None, Some("MPESA_CONSUMER_SECRET"))]
#[case(Some("key"), Some("secret"), None)]
fn production_requires_mpesa_credentials(
    mut base: HashMap<&'static str, String>,
    #[case] key: Option<&str>,
    #[case] secret: Option<&str>,
    #[case] missing: Option<&'static str>,
) {
    base.insert("ENVIRONMENT", "production".to_owned());
    if let Some(key) = key {
        base.insert("MPESA_CONSUMER_KEY", key.to_owned());
    }
    if let Some(secret) = secret {
        base.insert("MPESA_CONSUMER_SECRET", secret.to_owned());
    }
    match missing {
        Some(name) => assert_eq!(load(base).expect_err("missing"), ConfigError::MissingEnv { name }),
        None => assert!(load(base).expect("complete").environment.is_production()),
    }
}

#[rstest]
fn process_environment_is_read_within_a_scope() {
    let _guard = lock_env([
        (JWT_SECRET_ENV, Some("scoped-secret-value")),
        ("DATABASE_URL", Some("file:scoped.db")),
        ("ENVIRONMENT", Some("test")),
        ("PORT", Some("8181")),
    ]);
    let config = AppConfig::from_env(&DefaultEnv::new()).expect("scoped configuration");
    assert_eq!(config.environment, Environment::Test);
    assert_eq!(config.port, 8181);
    assert_eq!(config.database_url, "file:scoped.db");
}

#[rstest]
fn scoped_variables_are_removed_afterwards() {
    {
        let _guard = lock_env([("VAULTKE_SCOPED_PROBE", Some("set"))]);
        assert_eq!(std::env::var("VAULTKE_SCOPED_PROBE").as_deref(), Ok("set"));
    }
    assert!(std::env::var("VAULTKE_SCOPED_PROBE").is_err());
}
