//! # netpulse-cli
//!
//! Command-line interface for the netpulse host telemetry agent.
//!
//! ## Commands
//!
//! - **run**: the agent itself -- collection loop plus snapshot server
//! - **inspect-db**: load the vulnerability database through the strict
//!   path and report what it would contain
//! - **verify**: check a persisted envelope against the secret key

pub mod cli;

pub use cli::run;
