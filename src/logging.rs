//! Logger setup for the command-line binary.

use log::LevelFilter;

use crate::config::LoggingConfig;

/// Level filter for a logging config. Disabled logging maps to `Off`.
pub fn level_filter(config: &LoggingConfig) -> LevelFilter {
    if !config.enabled {
        return LevelFilter::Off;
    }

    match config.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Install `env_logger` writing to stderr.
///
/// `RUST_LOG`, when set, overrides the configured level. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_filter(config));
    builder.parse_default_env();
    builder.target(env_logger::Target::Stderr);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_is_off() {
        let config = LoggingConfig {
            enabled: false,
            level: "trace".to_string(),
        };
        assert_eq!(level_filter(&config), LevelFilter::Off);
    }

    #[test]
    fn level_names_are_case_insensitive() {
        let config = LoggingConfig {
            enabled: true,
            level: "DEBUG".to_string(),
        };
        assert_eq!(level_filter(&config), LevelFilter::Debug);
    }
}
