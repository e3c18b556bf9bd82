//! Logger setup.
//!
//! Library code only talks to the `log` facade. Binaries call [`init`] once
//! at startup to install an `env_logger` backend.

use log::LevelFilter;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static INSTALLED: OnceCell<LevelFilter> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    /// Enable colored output
    pub colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            colors: true,
        }
    }
}

impl LogConfig {
    /// Configured level, `info` when the string is not a level name.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Installs the logger. `RUST_LOG` wins over the configured level. Only the
/// first call has an effect; the returned level is the one in force.
pub fn init(config: &LogConfig) -> LevelFilter {
    *INSTALLED.get_or_init(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.level_filter());
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }
        builder.write_style(if config.colors {
            env_logger::WriteStyle::Auto
        } else {
            env_logger::WriteStyle::Never
        });
        // Another logger may already be installed, e.g. by a test harness.
        let _ = builder.try_init();
        log::max_level()
    })
}
