//! Logging setup for the smartmon daemon.
//!
//! Console output is always on; file output is optional and uses a daily
//! rolling appender. `RUST_LOG` overrides the configured level filter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for rolling daily log files; `None` disables file logging.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON-formatted events instead of the human-readable format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            log_dir: None,
            json_format: false,
        }
    }
}

/// Initialize the global tracing subscriber. Call once at startup.
///
/// The returned guard keeps the non-blocking file writer alive; hold it for
/// the lifetime of the process.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = rolling::daily(dir, "smartmon.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> =
                if config.json_format {
                    Box::new(fmt::layer().json().with_writer(writer))
                } else {
                    Box::new(fmt::layer().with_ansi(false).with_writer(writer))
                };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> =
        if config.json_format {
            Box::new(fmt::layer().json())
        } else {
            Box::new(fmt::layer())
        };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
