//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so rendered panels on stdout stay clean. `RUST_LOG`
//! overrides the level picked from `-v` flags.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl LogConfig {
    /// - 0 (no `-v`): warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+: trace
    pub fn from_verbosity(verbosity: u8, format: LogFormat) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, format }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = self.level.as_str().to_lowercase();
            EnvFilter::new(format!("warn,weather_dash={level},weather_dash_core={level}"))
        })
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = config.env_filter();
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(layer.json()).init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry().with(filter).with(layer.compact().without_time()).init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(filter).with(layer.without_time()).init();
        }
    }
}
