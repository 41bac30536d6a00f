//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Host telemetry agent
///
/// Samples OS and network state, correlates open services against a
/// vulnerability database, signs each snapshot, and serves the latest one
/// over plain HTTP.
#[derive(Parser, Debug)]
#[command(name = "netpulse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collection loop and snapshot server
    Run(RunArgs),

    /// Load the vulnerability database through the strict path and report stats
    InspectDb(InspectDbArgs),

    /// Verify a persisted envelope against the secret key
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// HMAC secret key (required; the agent refuses to start without it)
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Seconds slept between collection cycles
    #[arg(long, env = "DATA_COLLECTION_INTERVAL", default_value_t = 60)]
    pub interval: u64,

    /// Path to the semicolon-delimited vulnerability database
    #[arg(long, env = "CVE_DATABASE_PATH", default_value = "cve.csv")]
    pub database: PathBuf,

    /// Directory snapshots are written to and served from
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Snapshot server port
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct InspectDbArgs {
    /// Path to the semicolon-delimited vulnerability database
    #[arg(long, env = "CVE_DATABASE_PATH", default_value = "cve.csv")]
    pub database: PathBuf,

    /// Rows folded into the mapping per batch
    #[arg(long, default_value_t = netpulse_agent::cvedb::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Sample entries to print
    #[arg(long, default_value_t = 5)]
    pub sample: usize,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// HMAC secret key the envelope is checked against
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Envelope file to verify
    #[arg(long, default_value = "latest.json")]
    pub file: PathBuf,
}
