//! API configuration
//!
//! Layered with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults (development values)
//! 2. an optional TOML file, `$APP_CONFIG` or `config/reimburse.toml`
//! 3. `API_*` environment variables, `__` between nested keys
//!    (`API_LIFECYCLE__GRACE_WINDOW_SECS=1800`)

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::CoreError;
use domain_claims::LifecyclePolicy;

use crate::identity::Role;

/// Default location of the configuration file, without extension
pub const DEFAULT_CONFIG_PATH: &str = "config/reimburse";

/// Which claim store the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Postgres,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Lifecycle timing and limits, in config-friendly units
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    pub grace_window_secs: i64,
    pub overdue_after_days: i64,
    pub amount_ceiling: Decimal,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        let policy = LifecyclePolicy::default();
        Self {
            grace_window_secs: policy.grace_window.num_seconds(),
            overdue_after_days: policy.overdue_after.num_days(),
            amount_ceiling: policy.amount_ceiling,
        }
    }
}

impl LifecycleSettings {
    /// Validated policy for the engine
    pub fn to_policy(&self) -> Result<LifecyclePolicy, CoreError> {
        LifecyclePolicy::new(
            Duration::seconds(self.grace_window_secs),
            Duration::days(self.overdue_after_days),
            self.amount_ceiling,
        )
    }
}

/// One roster entry: the credential a staff member logs in with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaffEntry {
    pub credential: String,
    pub name: String,
    pub role: Role,
}

impl StaffEntry {
    fn new(credential: &str, name: &str, role: Role) -> Self {
        Self {
            credential: credential.to_string(),
            name: name.to_string(),
            role,
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    pub storage: StorageKind,
    /// Only read when `storage = "postgres"`
    pub database_url: String,
    pub lifecycle: LifecycleSettings,
    /// Staff roster
    pub staff: Vec<StaffEntry>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 8 * 3600,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            storage: StorageKind::Memory,
            database_url: "postgres://localhost/reimburse".to_string(),
            lifecycle: LifecycleSettings::default(),
            staff: vec![
                StaffEntry::new("A123456789", "rileychien", Role::Admin),
                StaffEntry::new("B123456789", "wang.xiaoming", Role::Staff),
                StaffEntry::new("C123456789", "li.xiaohua", Role::Staff),
            ],
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the config file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(config::File::with_name(&path).required(false))
    }

    /// Loads configuration from the given file source and environment
    pub fn from_file<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
