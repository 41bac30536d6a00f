//! Host telemetry sampling.
//!
//! Collection is partial-tolerant by contract: each collector walks its
//! fields in a fixed order, and the first failure logs the error, keeps
//! what was already collected, and stops. Nothing here ever returns an
//! error to the caller; failures only shrink the result.

mod identity;
mod metrics;

pub use identity::{collect_identity, IdentitySample};
pub use metrics::collect_system_metrics;
