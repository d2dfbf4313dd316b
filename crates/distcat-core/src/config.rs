//! Loader and source configuration
//!
//! Plain structs with `Default`, optionally read from a TOML file:
//!
//! ```toml
//! single_flight = true
//! event_capacity = 256
//! ```

use crate::error::CoreError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for [`crate::DistributionLoader`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Concurrent loads of one uncached group share a single fetch
    pub single_flight: bool,

    /// Capacity of the loader event channel
    pub event_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
            event_capacity: 256,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::InvalidConfig {
            message: e.to_string(),
        })?;

        if config.event_capacity == 0 {
            return Err(CoreError::InvalidConfig {
                message: "event_capacity must be greater than 0".to_string(),
            });
        }

        Ok(config)
    }

    /// Read a TOML config file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::read(path, e))?;
        Self::from_toml_str(&content)
    }
}

/// Configuration for [`crate::source::HttpSource`]
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Directory URL holding `group-<N>.json`
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
