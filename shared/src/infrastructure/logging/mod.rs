pub mod formatter;

pub use formatter::{init_logger, LogFormat, LoggerConfig};

use crate::config::Settings;

/// Initialize the logger from application settings. Production gets JSON
/// output; development gets the pretty formatter.
pub fn init_from_settings(settings: &Settings) {
    let config = LoggerConfig::from_settings(settings);
    formatter::init_logger(&config);
}
