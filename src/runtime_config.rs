//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the routing table.
//!
//! ## Environment Variables
//!
//! ### `OPROUTE_LOOKUP`
//!
//! Lookup strategy used by [`RoutingTable::find`](crate::router::RoutingTable::find):
//!
//! - `linear` (default): test every entry in registration order
//! - `trie`: walk a segment trie, then pick the earliest-registered candidate
//!
//! Both give the same answer for every request; the trie only changes the cost.
//!
//! ### `OPROUTE_SLOW_MATCH_US`
//!
//! Lookups slower than this many microseconds are logged at `warn`.
//! Default: `1000`.
//!
//! ## Usage
//!
//! ```rust
//! use oproute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("lookup: {}", config.lookup);
//! ```

use std::env;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// How the routing table searches its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    #[default]
    LinearScan,
    Trie,
}

impl LookupStrategy {
    /// Parse a strategy name; unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "linear_scan" | "linear-scan" => Some(LookupStrategy::LinearScan),
            "trie" | "radix" => Some(LookupStrategy::Trie),
            _ => None,
        }
    }
}

impl Display for LookupStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStrategy::LinearScan => write!(f, "linear_scan"),
            LookupStrategy::Trie => write!(f, "trie"),
        }
    }
}

/// Routing table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub lookup: LookupStrategy,
    /// Lookups slower than this are logged at `warn`.
    pub slow_match_threshold: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            lookup: LookupStrategy::default(),
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let strategy = lookup("OPROUTE_LOOKUP")
            .and_then(|v| LookupStrategy::parse(&v))
            .unwrap_or(defaults.lookup);
        let slow_match_threshold = lookup("OPROUTE_SLOW_MATCH_US")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_micros)
            .unwrap_or(defaults.slow_match_threshold);
        Self {
            lookup: strategy,
            slow_match_threshold,
        }
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupStrategy) -> Self {
        self.lookup = lookup;
        self
    }
}
