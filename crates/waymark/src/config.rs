//! Configuration for waymark
//!
//! TOML-backed provisioning of an initial roster and hasher choice, for
//! embedders that want the selector wired from a config file rather than
//! code. The selector itself never reads or writes any of this after
//! construction; live roster changes still go through
//! [`NodeSelector::add`](crate::selector::NodeSelector::add) /
//! [`remove`](crate::selector::NodeSelector::remove).
//!
//! # Example
//!
//! ```
//! use waymark::config::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     nodes = ["cache-1", "cache-2", "cache-3"]
//!     hasher = "fnv1a"
//! "#).unwrap();
//!
//! let selector = config.build_selector().unwrap();
//! assert_eq!(selector.len(), 3);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::hasher::{KeyHasher, fnv1a_64, siphash13_64};
use crate::logging::LogConfig;
use crate::selector::NodeSelector;

/// Built-in hasher selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherKind {
    /// FNV-1a 64-bit (default).
    Fnv1a,
    /// SipHash-1-3 with fixed keys.
    Siphash13,
}

impl HasherKind {
    /// Parse a hasher name as it appears in configuration.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "fnv1a" => Ok(Self::Fnv1a),
            "siphash13" => Ok(Self::Siphash13),
            other => Err(Error::UnknownHasher {
                name: other.to_string(),
            }),
        }
    }

    /// The hash function this kind names.
    #[must_use]
    pub fn resolve(self) -> KeyHasher {
        match self {
            Self::Fnv1a => fnv1a_64,
            Self::Siphash13 => siphash13_64,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial roster. Duplicates are deduplicated on first occurrence,
    /// same as repeated `add` calls.
    pub nodes: Vec<String>,

    /// Built-in hasher name: "fnv1a" or "siphash13". Validated at
    /// [`build_selector`](Self::build_selector) time so the error can name
    /// the offending value.
    pub hasher: String,

    /// Logging setup for the embedding application.
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            hasher: "fnv1a".to_string(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(
            path = %path.display(),
            nodes = config.nodes.len(),
            "loaded selector config"
        );
        Ok(config)
    }

    /// Build a selector from this configuration.
    ///
    /// Fails only on an unknown hasher name; an empty `nodes` list is valid
    /// and produces an empty selector.
    pub fn build_selector(&self) -> Result<NodeSelector<String>> {
        let hasher = HasherKind::from_name(&self.hasher)?.resolve();
        Ok(NodeSelector::new(self.nodes.iter().cloned(), hasher))
    }
}
