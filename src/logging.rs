//! Logging infrastructure for azdo-provider.
//!
//! This module provides optional tracing-based logging with support for:
//! - Multiple output targets (stderr, file)
//! - Configurable log levels
//! - Selectable format (text or JSON)

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a log level from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Convert to a filter string for tracing-subscriber.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

impl LogFormat {
    /// Parse a log format from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Default)]
pub struct LogConfig {
    /// Log level (None means logging is disabled).
    pub level: Option<LogLevel>,
    /// Output file path (None means stderr).
    pub file: Option<PathBuf>,
    /// Output format.
    pub format: LogFormat,
}

impl LogConfig {
    /// Read logging configuration from the environment.
    ///
    /// Recognizes `AZDO_PROVIDER_LOG_LEVEL`, `AZDO_PROVIDER_LOG_FILE`, and
    /// `AZDO_PROVIDER_LOG_FORMAT`. Logging stays disabled without a level.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("AZDO_PROVIDER_LOG_LEVEL")
                .ok()
                .and_then(|value| LogLevel::parse(&value)),
            file: std::env::var("AZDO_PROVIDER_LOG_FILE").ok().map(PathBuf::from),
            format: std::env::var("AZDO_PROVIDER_LOG_FORMAT")
                .ok()
                .and_then(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
        }
    }
}

/// Guard that must be held to ensure logs are flushed.
///
/// When this guard is dropped, all pending log messages are flushed.
/// Hold this until application exit.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
    _stderr_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// Returns `Some(LogGuard)` if logging was initialized, `None` if logging is
/// disabled. The guard must be held until application exit to ensure logs
/// are flushed.
#[must_use = "the returned guard must be held until application exit"]
pub fn init_logging(config: LogConfig) -> Option<LogGuard> {
    let level = config.level?;

    // Filter for this crate only, to avoid noise from dependencies.
    let filter = EnvFilter::new(format!("azdo_provider={}", level.as_filter_str()));

    let mut guards = LogGuard {
        _file_guard: None,
        _stderr_guard: None,
    };

    match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            guards._file_guard = Some(guard);

            match config.format {
                LogFormat::Json => {
                    let layer = fmt::layer()
                        .with_writer(non_blocking)
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_file(true)
                        .with_line_number(true);

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer)
                        .init();
                }
                LogFormat::Text => {
                    let layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true);

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer)
                        .init();
                }
            }
        }

        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
            guards._stderr_guard = Some(guard);

            match config.format {
                LogFormat::Json => {
                    let layer = fmt::layer()
                        .with_writer(non_blocking)
                        .json()
                        .with_span_events(FmtSpan::CLOSE);

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer)
                        .init();
                }
                LogFormat::Text => {
                    let layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_level(true)
                        .compact();

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer)
                        .init();
                }
            }
        }
    }

    Some(guards)
}
