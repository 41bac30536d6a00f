//! Core types for the netpulse telemetry agent.
//!
//! This crate provides the foundational types used across the agent:
//!
//! - **Types**: Telemetry snapshots, connections, vulnerability records,
//!   and the signed envelope that gets persisted each cycle
//! - **Errors**: The agent-wide error taxonomy with [`AgentError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use netpulse_core::{TelemetrySnapshot, Result};
//!
//! fn describe(snapshot: &TelemetrySnapshot) -> Result<String> {
//!     Ok(snapshot.canonical_json()?)
//! }
//! ```

mod error;
pub mod types;

pub use error::{AgentError, Result};
pub use types::*;
