//! Error types for waymark
//!
//! Selector operations themselves are infallible by design: an empty roster
//! is a normal condition reported as `None`, and a missing hash function is
//! unrepresentable (the constructors require a function value). What can
//! fail is the surrounding plumbing — loading configuration and initializing
//! logging — and those failures live here.

use thiserror::Error;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a configuration file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text was not valid TOML or did not match the schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration named a hasher this crate does not ship.
    #[error("unknown hasher '{name}' (expected one of: fnv1a, siphash13)")]
    UnknownHasher {
        /// The name as it appeared in the configuration.
        name: String,
    },

    /// Logging initialization failed.
    #[error("logging setup failed: {0}")]
    Logging(#[from] crate::logging::LogError),
}

/// Convenience result alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
