//! Layered TOML configuration: `config.toml` -> `config.{CONFIG_ENV}.toml` ->
//! `config.local.toml`, later files overriding earlier ones. The FIX
//! per-session settings file (`src/fix/settings.rs`) is a distinct format and
//! is loaded separately, pointed at by [`TradingFixConfig::config_path`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub trading: TradingFixConfig,
    #[serde(default)]
    pub initiator: TradingInitiatorConfig,
    #[serde(default)]
    pub locate: LocateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// `trading.*`: the engine-level side of the dual-role session, layered on
/// top of the FIX settings file named by `config_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingFixConfig {
    #[serde(default = "default_trading_enabled")]
    pub enabled: bool,
    /// Path to the line-oriented FIX settings file (`[DEFAULT]`/`[SESSION]`).
    pub config_path: String,
    /// Session alias (SenderCompID/qualifier) of the order-entry initiator
    /// used for locate traffic and primary-account order entry.
    pub primary_session: String,
    /// Session aliases of the shadow order-entry initiators.
    #[serde(default)]
    pub shadow_sessions: Vec<String>,
    /// Shadow account id -> account number, consumed at bootstrap to seed
    /// the `accounts` table ahead of the first `AccountCache::refresh()`.
    #[serde(default)]
    pub shadow_accounts: std::collections::HashMap<String, String>,
    #[serde(default = "default_cl_ord_id_prefix")]
    pub cl_ord_id_prefix: String,
    /// Drop-copy acceptor session alias.
    pub drop_copy_session: String,
}

fn default_trading_enabled() -> bool {
    true
}

fn default_cl_ord_id_prefix() -> String {
    "MIRROR-".to_string()
}

/// `trading.initiator.*`: the Trading-Hours Guard's configured window (C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingInitiatorConfig {
    #[serde(default = "default_trading_start_hour")]
    pub trading_start_hour: u32,
    #[serde(default = "default_trading_end_hour")]
    pub trading_end_hour: u32,
    #[serde(default = "default_non_trading_resume_hour")]
    pub non_trading_resume_hour: u32,
    #[serde(default = "default_trading_zone")]
    pub trading_zone: String,
}

fn default_trading_start_hour() -> u32 {
    4
}
fn default_trading_end_hour() -> u32 {
    20
}
fn default_non_trading_resume_hour() -> u32 {
    6
}
fn default_trading_zone() -> String {
    "America/New_York".to_string()
}

impl Default for TradingInitiatorConfig {
    fn default() -> Self {
        Self {
            trading_start_hour: default_trading_start_hour(),
            trading_end_hour: default_trading_end_hour(),
            non_trading_resume_hour: default_non_trading_resume_hour(),
            trading_zone: default_trading_zone(),
        }
    }
}

impl TradingInitiatorConfig {
    /// Resolves the configured IANA zone name, falling back to
    /// `America/New_York` (and logging a warning) if it doesn't parse.
    pub fn resolve_zone(&self) -> chrono_tz::Tz {
        self.trading_zone.parse().unwrap_or_else(|_| {
            tracing::warn!(zone = %self.trading_zone, "unrecognised trading zone, falling back to America/New_York");
            chrono_tz::America::New_York
        })
    }

    pub fn to_guard_config(&self) -> crate::domain::trading_hours::TradingHoursConfig {
        crate::domain::trading_hours::TradingHoursConfig {
            trading_start_hour: self.trading_start_hour,
            trading_end_hour: self.trading_end_hour,
            non_trading_resume_hour: self.non_trading_resume_hour,
            trading_zone: self.resolve_zone(),
        }
    }
}

/// `locate.*`: the short-locate negotiation's timeout (C7/C8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateConfig {
    #[serde(default = "default_locate_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_locate_timeout_seconds() -> u64 {
    30
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self { timeout_seconds: default_locate_timeout_seconds() }
    }
}

impl LocateConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable file logging
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,
    /// Directory for log files (relative to executable or absolute path)
    #[serde(default = "default_log_directory")]
    pub directory: String,
    /// Prefix for log file names
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
    /// Rotation strategy: "daily", "hourly", or "never"
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
    /// Maximum number of log files to keep (0 = unlimited)
    #[serde(default = "default_max_files")]
    pub max_files: u32,
    /// Maximum age of log files in days (0 = unlimited)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

fn default_logging_enabled() -> bool {
    true
}
fn default_log_directory() -> String {
    "logs".to_string()
}
fn default_log_file_prefix() -> String {
    "mirror-fix-gateway".to_string()
}
fn default_log_rotation() -> String {
    "daily".to_string()
}
fn default_max_files() -> u32 {
    30
}
fn default_max_age_days() -> u32 {
    90
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            rotation: default_log_rotation(),
            max_files: default_max_files(),
            max_age_days: default_max_age_days(),
        }
    }
}

impl Config {
    /// Loads configuration files in the following order (later files override earlier):
    /// 1. `{base_name}.toml` (required)
    /// 2. `{base_name}.{CONFIG_ENV}.toml` (optional, only if `CONFIG_ENV` is set)
    /// 3. `{base_name}.local.toml` (optional, for personal overrides, git-ignored)
    pub fn from_file<P: AsRef<Path>>(base_name: P) -> Result<Self> {
        let base_path = base_name.as_ref();
        let base_str = base_path.to_str().context("invalid base config path")?;

        let mut builder = config::Config::builder().add_source(config::File::with_name(base_str));

        if let Ok(env) = std::env::var("CONFIG_ENV") {
            let env_config = format!("{}.{}", base_str, env);
            builder = builder.add_source(config::File::with_name(&env_config).required(false));
        }

        let local_config = format!("{}.local", base_str);
        builder = builder.add_source(config::File::with_name(&local_config).required(false));

        let config = builder.build().context("failed to build configuration")?;
        config.try_deserialize().context("failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            database: DatabaseConfig { url: "sqlite://mirror-fix-gateway.db?mode=rwc".to_string() },
            trading: TradingFixConfig {
                enabled: true,
                config_path: "fix-settings.cfg".to_string(),
                primary_session: "GATEWAY".to_string(),
                shadow_sessions: vec!["SHADOW1".to_string()],
                shadow_accounts: std::collections::HashMap::new(),
                cl_ord_id_prefix: "MIRROR-".to_string(),
                drop_copy_session: "BROKER".to_string(),
            },
            initiator: TradingInitiatorConfig::default(),
            locate: LocateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn initiator_config_defaults_match_spec() {
        let initiator = TradingInitiatorConfig::default();
        assert_eq!(initiator.trading_start_hour, 4);
        assert_eq!(initiator.trading_end_hour, 20);
        assert_eq!(initiator.non_trading_resume_hour, 6);
        assert_eq!(initiator.resolve_zone(), chrono_tz::America::New_York);
    }

    #[test]
    fn locate_config_default_timeout_is_30_seconds() {
        assert_eq!(LocateConfig::default().timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn unrecognised_zone_falls_back_to_new_york() {
        let mut initiator = TradingInitiatorConfig::default();
        initiator.trading_zone = "Not/AZone".to_string();
        assert_eq!(initiator.resolve_zone(), chrono_tz::America::New_York);
    }

    #[test]
    fn toml_round_trips_through_serde() {
        let config = sample_config();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[trading]"));
        assert!(toml_str.contains("[database]"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.trading.primary_session, "GATEWAY");
    }
}
