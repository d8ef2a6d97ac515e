use crate::config::Settings;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

pub struct LoggerConfig {
    pub rust_log: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl LoggerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let format = if settings.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        Self {
            rust_log: settings.logging.rust_log.clone(),
            format,
            include_location: env::var("LOG_INCLUDE_LOCATION")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }
}

/// Initialize the logger with the given configuration
pub fn init_logger(config: &LoggerConfig) {
    // RUST_LOG from the environment always wins.
    if env::var("RUST_LOG").is_err() && !config.rust_log.is_empty() {
        env::set_var("RUST_LOG", &config.rust_log);
    }

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .json()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .pretty()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .init();
        }
    }
}
