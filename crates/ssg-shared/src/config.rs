//! Configuration management

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_SESSION_TTL_SECONDS, DEFAULT_STORE_TIMEOUT_MS,
    DEFAULT_SWEEP_INTERVAL_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub security: SecuritySettings,
    pub site: SiteSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_seconds: i64,
    /// 0 disables the background sweeper.
    pub sweep_interval_seconds: u64,
    pub store_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecuritySettings {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    /// Root directory generated pages are pushed to and served from.
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// `json` or `pretty`
    pub log_format: String,
    /// Optional directory for a daily rolling log file.
    pub log_dir: Option<String>,
}

impl SessionSettings {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_seconds > 0).then(|| Duration::from_secs(self.sweep_interval_seconds))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder_with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    fn builder_with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "ssg-server")?
            .set_default("server.request_timeout_seconds", 30)?
            .set_default("database.url", "postgres://localhost:5432/ssg")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("database.run_migrations", true)?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL_SECONDS)?
            .set_default("session.sweep_interval_seconds", DEFAULT_SWEEP_INTERVAL_SECONDS as i64)?
            .set_default("session.store_timeout_ms", DEFAULT_STORE_TIMEOUT_MS as i64)?
            .set_default("security.bcrypt_cost", DEFAULT_BCRYPT_COST as i64)?
            .set_default("site.output_dir", "static")?
            .set_default("telemetry.log_format", "pretty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = AppConfig::builder_with_defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.session.ttl_seconds, 300);
        assert_eq!(config.session.ttl(), chrono::Duration::minutes(5));
        assert_eq!(config.security.bcrypt_cost, 10);
        assert!(config.telemetry.log_dir.is_none());
    }

    #[test]
    fn test_sweep_interval_zero_disables() {
        let settings = SessionSettings {
            sweep_interval_seconds: 0,
            ..SessionSettings::default()
        };
        assert!(settings.sweep_interval().is_none());
        assert_eq!(
            SessionSettings::default().sweep_interval(),
            Some(Duration::from_secs(60))
        );
    }
}
