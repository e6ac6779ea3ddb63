use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::scraper::BROWSER_USER_AGENT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret a scheduled caller presents as `Authorization: Bearer <secret>`.
    pub cron_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub user_agent: String,
    /// Per HTTP request.
    pub request_timeout_secs: u64,
    /// Per item during a refresh cycle, across all requests its strategy makes.
    pub refresh_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub cron: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Fallback when no `notification_email` setting is stored.
    pub recipient: Option<String>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
}

impl AppConfig {
    /// Load from `config/` under the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load("config")
    }

    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Local overrides (ignored by git)
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            // Environment variables such as WATCHER__SERVER__PORT=8080
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Hosting platforms conventionally expose the cron secret under this name
        if config.security.cron_secret.is_none() {
            config.security.cron_secret = env::var("CRON_SECRET").ok().filter(|s| !s.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://price-monitor.db")?
            .set_default("database.max_connections", 5)?
            .set_default("scraper.user_agent", BROWSER_USER_AGENT)?
            .set_default("scraper.request_timeout_secs", 20)?
            .set_default("scraper.refresh_timeout_secs", 30)?
            .set_default("scheduler.enabled", false)?
            .set_default("scheduler.cron", "0 0 */6 * * *")?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9001)?
            .set_default("logging.level", "info")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port must be greater than 0".into()));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message("Database url must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message("Database max_connections must be greater than 0".into()));
        }

        if let Some(secret) = &self.security.cron_secret {
            if secret.len() < 16 {
                return Err(ConfigError::Message("Security cron_secret must be at least 16 characters".into()));
            }
        }

        if self.scraper.request_timeout_secs == 0 || self.scraper.refresh_timeout_secs == 0 {
            return Err(ConfigError::Message("Scraper timeouts must be greater than 0".into()));
        }

        if self.scheduler.enabled && !is_valid_cron(&self.scheduler.cron) {
            return Err(ConfigError::Message("Invalid cron expression in scheduler.cron".into()));
        }

        if let Some(smtp) = &self.notifications.smtp {
            if smtp.port == 0 {
                return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
            }
            if !smtp.from_address.contains('@') {
                return Err(ConfigError::Message("SMTP from_address must be an email address".into()));
            }
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }
}

/// The scheduler takes `sec min hour day month weekday [year]`.
pub fn is_valid_cron(cron_expr: &str) -> bool {
    let parts: Vec<&str> = cron_expr.split_whitespace().collect();
    if parts.len() != 6 && parts.len() != 7 {
        return false;
    }

    parts.iter().all(|part| {
        part.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | ',' | '/' | '?'))
    })
}
