//! Agent configuration.

use netpulse_core::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default seconds slept between collection cycles.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default vulnerability database path, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "cve.csv";

/// Default snapshot server port.
pub const DEFAULT_SERVE_PORT: u16 = 8000;

/// Configuration for a netpulse agent process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// HMAC secret key. The only required setting; an empty key is a fatal
    /// startup error.
    pub secret_key: String,

    /// Seconds slept after each cycle completes (default 60). The wall-clock
    /// period is cycle time plus this interval, not a fixed cadence.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Path to the semicolon-delimited vulnerability database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory snapshots are written to and served from.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Port the snapshot server listens on for the process lifetime.
    #[serde(default = "default_serve_port")]
    pub serve_port: u16,
}

impl AgentConfig {
    /// Config with the given secret key and defaults for everything else.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            interval_secs: default_interval(),
            database_path: default_database_path(),
            data_dir: default_data_dir(),
            serve_port: default_serve_port(),
        }
    }

    /// The startup configuration check. Everything else in the agent is
    /// absorbed at the cycle boundary; this is the one fatal gate.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if the secret key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(AgentError::Config(
                "SECRET_KEY is not set; refusing to start without an HMAC key".into(),
            ));
        }
        Ok(())
    }
}

// Default value functions for serde.
const fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_serve_port() -> u16 {
    DEFAULT_SERVE_PORT
}
