//! # netpulse-agent
//!
//! Host telemetry agent: samples OS and network state, correlates open
//! services against a vulnerability-description database, signs the result,
//! persists it, and serves the latest snapshot over plain HTTP.
//!
//! ## Cycle Data Flow
//!
//! ```text
//! Scheduler startup (once)
//!   server::spawn()            -- static responder over the data directory
//!   DatabaseHandle::reload()   -- stream the vulnerability database into memory
//!
//! Each cycle
//!   sampler::collect_system_metrics() + sampler::collect_identity()
//!   -> Correlator::count_matches(connections, database)
//!   -> TelemetrySnapshot::canonical_json()
//!   -> sign::sign(text, secret_key)
//!   -> writer::write_envelope() -> {timestamped file, latest.json}
//!   -> sleep(interval) and repeat
//! ```
//!
//! A failed stage abandons the cycle; the loop itself never stops. The only
//! fatal error in the whole crate is a missing secret key at startup.

pub mod config;
pub mod correlate;
pub mod cvedb;
pub mod fingerprint;
pub mod sampler;
pub mod scheduler;
pub mod server;
pub mod sign;
pub mod writer;

pub use config::AgentConfig;
pub use correlate::Correlator;
pub use cvedb::{load_database, DatabaseHandle, LoadOptions};
pub use scheduler::Scheduler;
