//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! The wrapped pipeline exposes one global log level that the host language
//! can read and change at runtime. It is modelled as [`LogLevel`] and backed
//! by a reloadable `LevelFilter` in front of the formatting layer.
//!
//! # Log Levels
//!
//! | `LogLevel` | tracing filter |
//! |------------|----------------|
//! | `Quiet`    | `OFF`          |
//! | `Error`    | `ERROR`        |
//! | `User`     | `INFO`         |
//! | `Debug`    | `DEBUG`        |
//! | `All`      | `TRACE`        |

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, Registry};

use crate::codec::enums::named_enum;

named_enum! {
    /// Verbosity of the wrapper's log output.
    pub enum LogLevel as "LogLevel" {
        Quiet,
        Error,
        User,
        Debug,
        All,
    }
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::User => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::All => LevelFilter::TRACE,
        }
    }

    /// Closest level for a tracing filter. `WARN` maps to `Error`.
    pub fn from_level_filter(filter: LevelFilter) -> Self {
        if filter == LevelFilter::OFF {
            LogLevel::Quiet
        } else if filter <= LevelFilter::WARN {
            LogLevel::Error
        } else if filter == LevelFilter::INFO {
            LogLevel::User
        } else if filter == LevelFilter::DEBUG {
            LogLevel::Debug
        } else {
            LogLevel::All
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::User
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Failed to change log level: {0}")]
    Reload(String),
}

/// Configuration for the global subscriber.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            with_target: false,
            with_ansi: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LogLevel::User.index());
static RELOAD_HANDLE: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Install the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns [`LoggingError::AlreadyInitialized`] if a global subscriber is
/// already set, by this function or by the embedding application.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let (filter, handle) = reload::Layer::new(config.level.level_filter());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_ansi(config.with_ansi)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    // Only the first successful try_init reaches this point.
    let _ = RELOAD_HANDLE.set(handle);
    CURRENT_LEVEL.store(config.level.index(), Ordering::Release);
    Ok(())
}

/// Current global log level.
pub fn log_level() -> LogLevel {
    LogLevel::all()
        .get(CURRENT_LEVEL.load(Ordering::Acquire))
        .copied()
        .unwrap_or_default()
}

/// Change the global log level.
///
/// Takes effect immediately when [`init_logging`] installed the subscriber;
/// otherwise the level is only recorded.
pub fn set_log_level(level: LogLevel) -> Result<(), LoggingError> {
    if let Some(handle) = RELOAD_HANDLE.get() {
        handle
            .reload(level.level_filter())
            .map_err(|e| LoggingError::Reload(e.to_string()))?;
    }
    CURRENT_LEVEL.store(level.index(), Ordering::Release);
    Ok(())
}
