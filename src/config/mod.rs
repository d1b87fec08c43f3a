use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
    pub export: ExportConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Simulated backend timing
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Base delay between progress steps. Zero disables waiting.
    pub stage_delay_ms: u64,
}

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH")
                    .unwrap_or_else(|_| "./data/resume_enhancer.db".to_string()),
            ),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let simulation = SimulationConfig {
            stage_delay_ms: parse_var("STAGE_DELAY_MS", 800)?,
        };

        let export = ExportConfig {
            dir: PathBuf::from(env::var("EXPORT_DIR").unwrap_or_else(|_| "./exports".to_string())),
        };

        Ok(Config {
            database,
            logging,
            simulation,
            export,
        })
    }
}

/// Read a numeric variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| AppError::Config {
            message: format!("{} must be a non-negative integer, got '{}'", name, raw),
        }),
        Err(_) => Ok(default),
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/resume_enhancer.db"),
            max_connections: 5,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { stage_delay_ms: 800 }
    }
}

impl SimulationConfig {
    /// No waiting between progress steps.
    pub fn instant() -> Self {
        Self { stage_delay_ms: 0 }
    }
}
