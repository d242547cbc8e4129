use serde::{Deserialize, Serialize};
use std::env;

/// 冷却期上限：一年
pub const MAX_NOTIFICATION_COOLDOWN_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Absence check
    pub inactivity_threshold_days: i64,
    pub notification_cooldown_hours: Option<i64>,
    pub check_concurrency: usize,
    pub fail_fast: bool,

    // Trigger
    pub check_interval_secs: u64,
    pub run_once: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let notification_cooldown_hours = match env::var("NOTIFICATION_COOLDOWN_HOURS") {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().parse()?),
            _ => None,
        };

        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "rainbow".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "gym".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            inactivity_threshold_days: env::var("INACTIVITY_THRESHOLD_DAYS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            notification_cooldown_hours,
            check_concurrency: env::var("CHECK_CONCURRENCY")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            fail_fast: env::var("FAIL_FAST")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,

            check_interval_secs: env::var("CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()?,
            run_once: env::var("RUN_ONCE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inactivity_threshold_days < 0 {
            anyhow::bail!("INACTIVITY_THRESHOLD_DAYS must not be negative");
        }
        if let Some(hours) = self.notification_cooldown_hours {
            if hours <= 0 || hours > MAX_NOTIFICATION_COOLDOWN_HOURS {
                anyhow::bail!(
                    "NOTIFICATION_COOLDOWN_HOURS must be between 1 and {} when set",
                    MAX_NOTIFICATION_COOLDOWN_HOURS
                );
            }
        }
        if self.check_interval_secs == 0 {
            anyhow::bail!("CHECK_INTERVAL_SECS must be positive");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            database_url: "http://localhost:8000".to_string(),
            database_namespace: "rainbow".to_string(),
            database_name: "gym".to_string(),
            database_username: "root".to_string(),
            database_password: "root".to_string(),
            inactivity_threshold_days: 3,
            notification_cooldown_hours: None,
            check_concurrency: 8,
            fail_fast: false,
            check_interval_secs: 86_400,
            run_once: false,
        }
    }
}
