//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a sectree.toml, and if present we load settings from there.
//! This provides wrapping width, reorder/preview switches, live reload and the locations
//! of the journal, host outbox and log file. Empty paths mean "not configured".

use crate::error::{Error, Result};
use facet::Facet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "sectree.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from sectree.toml or falling back to defaults.
pub struct Config {
    #[facet(default = 100)]
    /// Maximum line width for editor text wrapping.
    pub wrap_width: usize,
    #[facet(default = true)]
    /// Lay sections out inside the reorder region.
    pub reorder_enabled: bool,
    #[facet(default = false)]
    /// Open the document read-only.
    pub preview: bool,
    #[facet(default = true)]
    /// Reload the document when it changes on disk.
    pub watch: bool,
    #[facet(default = 200)]
    /// Quiet period in milliseconds before a change triggers a reload.
    pub debounce_ms: u64,
    #[facet(default = "layout-".to_string())]
    /// Key prefix recognised on structural wrappers.
    pub wrapper_prefix: String,
    #[facet(default = String::new())]
    /// NDJSON edit journal; empty keeps edits in memory.
    pub journal_path: String,
    #[facet(default = String::new())]
    /// NDJSON host outbox; empty prints notifications on exit.
    pub host_outbox: String,
    #[facet(default = String::new())]
    /// Log file; empty disables logging.
    pub log_file: String,
}

impl Config {
    /// Load configuration from sectree.toml if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).unwrap_or_default();
        facet_toml::from_str::<Self>(&contents).map_err(|e| Error::Config(e.to_string()))
    }

    #[must_use]
    /// Reload debounce as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    /// `value` as a path, unless empty.
    pub fn non_empty(value: &str) -> Option<&Path> {
        (!value.is_empty()).then(|| Path::new(value))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
