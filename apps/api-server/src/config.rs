//! Application configuration loaded from environment variables.

use std::env;

use agora_core::services::VerificationConfig;
use agora_infra::{DatabaseConfig, JwtConfig};

#[cfg(feature = "scheduler")]
use crate::background::SchedulerConfig;
use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub auth: JwtConfig,
    pub verification: VerificationConfig,
    pub telemetry: TelemetryConfig,
    #[cfg(feature = "scheduler")]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            auth: JwtConfig::from_env(),
            verification: VerificationConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
            #[cfg(feature = "scheduler")]
            scheduler: SchedulerConfig::from_env(),
        }
    }
}
