//! Logging setup shared by the server and client binaries

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The log level to use
    pub level: Level,
    /// Optional log file, written in addition to stdout
    pub file: Option<PathBuf>,
    /// Whether to include file and line information
    pub file_info: bool,
    /// Application name to include in logs
    pub app_name: String,
    /// Level string that could not be parsed, reported once logging is up
    unrecognized_level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            file: None,
            file_info: false,
            app_name: "pgw".to_string(),
            unrecognized_level: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Build from a configured level string; unknown levels fall back to INFO
    pub fn from_level_str(level: &str, app_name: impl Into<String>) -> Self {
        match parse_log_level(level) {
            Ok(parsed) => Self::new(parsed, app_name),
            Err(_) => LoggingConfig {
                unrecognized_level: Some(level.to_string()),
                ..Self::new(Level::INFO, app_name)
            },
        }
    }

    /// Also write logs to `path`
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable file and line information in logs
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }
}

/// Set up the logging system with the provided configuration.
///
/// The returned guard flushes the log file when dropped and must be kept
/// alive for the lifetime of the process.
pub fn setup_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let console = fmt::layer()
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_file(config.file_info)
                .with_line_number(config.file_info)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::logging(e.to_string()))?;

    if let Some(level) = &config.unrecognized_level {
        tracing::warn!("Unknown log level '{}', using info", level);
    }
    tracing::info!("Logger '{}' initialized", config.app_name);

    Ok(guard)
}

fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::logging(format!("Invalid log file path: {}", path.display())))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)
        .map_err(|e| Error::logging(format!("Cannot open log file {}: {}", path.display(), e)))
}

/// Parse a log level from a string.
///
/// Case-insensitive; `critical` is treated as `error`.
pub fn parse_log_level(level: &str) -> Result<Level> {
    let normalized = level.trim().to_ascii_lowercase();
    if normalized == "critical" {
        return Ok(Level::ERROR);
    }
    Level::from_str(&normalized)
        .map_err(|_| Error::invalid_config(format!("Invalid log level: {}", level)))
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("Starting {} v{}", app_name, version);
}
