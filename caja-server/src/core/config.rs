use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::utils::time;

/// Server configuration
///
/// # Environment variables
///
/// All items can be overridden via environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | DATABASE_PATH | WORK_DIR/caja.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | BUSINESS_TIMEZONE | Europe/Madrid | Business timezone |
/// | BUSINESS_DAY_CUTOFF | 00:00 | HH:MM boundary of the business day |
/// | CASH_VARIANCE_WARN_THRESHOLD | 0.01 | Minimum abs variance that warns |
/// | LOG_LEVEL | info | tracing level filter |
/// | ENVIRONMENT | development | development / staging / production |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// SQLite database file path
    pub database_path: String,
    /// HTTP API port
    pub http_port: u16,
    /// Business timezone for calendar-day boundaries
    pub timezone: Tz,
    /// Business day cutoff: times before it belong to the previous date
    pub business_day_cutoff: NaiveTime,
    /// Minimum absolute cash variance that produces a close warning
    pub cash_variance_warn_threshold: f64,
    /// tracing level filter
    pub log_level: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, using defaults for
    /// anything unset
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/caja.db", work_dir.trim_end_matches('/')));
        let timezone = std::env::var("BUSINESS_TIMEZONE")
            .ok()
            .and_then(|tz| tz.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::Europe::Madrid);
        let business_day_cutoff = time::parse_cutoff(
            &std::env::var("BUSINESS_DAY_CUTOFF").unwrap_or_else(|_| "00:00".into()),
        );

        Self {
            work_dir,
            database_path,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone,
            business_day_cutoff,
            cash_variance_warn_threshold: std::env::var("CASH_VARIANCE_WARN_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.01),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Is production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
