//! Configuration Module
//!
//! Defines the configuration structures for the engine. Configuration is
//! loaded from a TOML file and parsed with serde; a bad or missing file is a
//! fatal startup error, there are no implicit defaults.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [batch]
/// frequency_secs = 5
/// batch_size = 10
///
/// [api]
/// host = "127.0.0.1"
/// port = 8080
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub batch: RunConfig,
    pub api: ApiConfig,
}

/// Batching configuration
///
/// The live, runtime-mutable slice of configuration owned by the
/// orchestrator.
///
/// # Fields
/// - `frequency_secs`: seconds between flush cycles
/// - `batch_size`: maximum number of jobs dispatched per flush
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub frequency_secs: u64,
    pub batch_size: usize,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was read, parsed, and validated
    /// * `Err` if the file couldn't be read, the TOML is invalid, or a
    ///   value fails validation
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;

        anyhow::ensure!(
            config.batch.frequency_secs > 0,
            "batch.frequency_secs must be positive"
        );
        anyhow::ensure!(
            config.batch.batch_size > 0,
            "batch.batch_size must be positive"
        );

        Ok(config)
    }
}
