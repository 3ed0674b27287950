//! Structured logging for waymark
//!
//! Thin `tracing` setup with configurable format and destination. The
//! library itself only emits `debug!` events on roster changes; this module
//! exists so embedding applications and integration harnesses can turn
//! those on without wiring their own subscriber.
//!
//! # Usage
//!
//! Initialize once at startup:
//!
//! ```ignore
//! use waymark::logging::{LogConfig, LogFormat, init_logging};
//!
//! let config = LogConfig {
//!     level: "debug".to_string(),
//!     format: LogFormat::Pretty,
//!     file: None,
//! };
//! init_logging(&config)?;
//! ```
//!
//! The `RUST_LOG` environment variable overrides the configured level.

use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Global flag to track if logging has been initialized
static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-friendly output for interactive use
    Pretty,
    /// JSON lines for CI and ops tooling
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (trace, debug, info, warn, error).
    /// Can be overridden by the RUST_LOG environment variable.
    pub level: String,

    /// Output format (pretty or json)
    pub format: LogFormat,

    /// Optional path to a log file; when set, logs are appended there in
    /// addition to stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,

    #[error("failed to create log file: {0}")]
    FileCreate(#[from] io::Error),

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize the global logging subscriber.
///
/// Call once at application startup; subsequent calls return
/// `Err(LogError::AlreadyInitialized)`.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_writer = if let Some(path) = &config.file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        )
    } else {
        None
    };

    match config.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .with_ansi(true),
            );
            if let Some(file) = file_writer {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_target(true)
                    .with_ansi(false);
                tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
            } else {
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr));
            if let Some(file) = file_writer {
                let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);
                tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
            } else {
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }
    }

    let _ = LOGGING_INITIALIZED.set(true);
    Ok(())
}
