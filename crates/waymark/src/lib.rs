//! waymark: deterministic key-to-node selection via rendezvous hashing
//!
//! Given a roster of node identifiers and a lookup key, waymark picks the
//! node (or an ordered top-N of nodes) responsible for that key — the same
//! pick on every call, on every host, with no coordination service. Adding
//! or removing a node remaps only the keys that node wins or loses, never
//! the whole keyspace, which makes this the standard building block for
//! client-side sharding, load balancing, and replica placement.
//!
//! # Modules
//!
//! - `selector`: the node roster and lookup engine ([`NodeSelector`])
//! - `mix`: the 64-bit score scrambler behind every selection
//! - `hasher`: built-in byte hashers (FNV-1a, SipHash-1-3)
//! - `config`: TOML provisioning of an initial roster
//! - `logging`: tracing subscriber setup for embedders
//! - `error`: crate error type
//!
//! # Quick start
//!
//! ```
//! use waymark::{NodeSelector, hasher::fnv1a_64};
//!
//! let mut selector = NodeSelector::new(vec!["db-1", "db-2", "db-3"], fnv1a_64);
//! let before = selector.lookup("tenant:1729").cloned();
//!
//! selector.add("db-4");
//! let after = selector.lookup("tenant:1729").cloned();
//!
//! // A key either keeps its node or moves to the new one — never to a third.
//! assert!(after == before || after == Some("db-4"));
//! ```
//!
//! # Out of scope
//!
//! Roster distribution, failure detection, and persistence are the caller's
//! problem: waymark computes placement, nothing else. The structure is not
//! internally synchronized — `&mut self` mutation under a caller-owned lock,
//! or copy-on-write replacement, when readers and writers overlap.
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod mix;
pub mod selector;

pub use error::{Error, Result};
pub use hasher::KeyHasher;
pub use selector::{DistributionStats, NodeSelector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
