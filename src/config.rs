//! Configuration for urlshort
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShortenerError};

/// Main configuration for a urlshort server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Single-file store holding every bucket
    pub store_path: PathBuf,

    /// Bucket holding the path → URL mappings
    pub bucket: String,

    // -------------------------------------------------------------------------
    // Merge Sources
    // -------------------------------------------------------------------------
    /// YAML path map, applied after the built-in defaults
    pub yaml_path: PathBuf,

    /// JSON path map, applied last
    pub json_path: PathBuf,

    // -------------------------------------------------------------------------
    // HTTP Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Location used when a path has no mapping
    pub fallback_location: String,

    /// How unmapped paths are answered
    pub miss_policy: MissPolicy,

    /// Per-request timeout (milliseconds, 0 disables)
    pub request_timeout_ms: u64,
}

/// Response for a path with no mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissPolicy {
    /// 302 Found to the fallback location
    #[default]
    Redirect,

    /// Plain 404 Not Found
    NotFound,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("bolt.db"),
            bucket: "default".to_string(),
            yaml_path: PathBuf::from("map.yaml"),
            json_path: PathBuf::from("map.json"),
            listen_addr: "0.0.0.0:8080".to_string(),
            fallback_location: "/".to_string(),
            miss_policy: MissPolicy::Redirect,
            request_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings that would only fail later, mid-startup
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(ShortenerError::Config("bucket name must not be empty".into()));
        }
        if self.fallback_location.is_empty() {
            return Err(ShortenerError::Config(
                "fallback location must not be empty".into(),
            ));
        }
        if self.listen_addr.is_empty() {
            return Err(ShortenerError::Config("listen address must not be empty".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store file path
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = path.into();
        self
    }

    /// Set the bucket name
    pub fn bucket(mut self, name: impl Into<String>) -> Self {
        self.config.bucket = name.into();
        self
    }

    /// Set the YAML path map file
    pub fn yaml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.yaml_path = path.into();
        self
    }

    /// Set the JSON path map file
    pub fn json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.json_path = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the fallback redirect location
    pub fn fallback_location(mut self, location: impl Into<String>) -> Self {
        self.config.fallback_location = location.into();
        self
    }

    /// Set the miss policy
    pub fn miss_policy(mut self, policy: MissPolicy) -> Self {
        self.config.miss_policy = policy;
        self
    }

    /// Set the request timeout (in milliseconds)
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
