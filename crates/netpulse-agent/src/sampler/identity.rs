//! Network identity: hostname and primary outbound address.

use netpulse_core::{AgentError, Result};
use std::net::{IpAddr, UdpSocket};
use tracing::error;

/// Hostname and address, each absent past the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySample {
    /// Host name
    pub hostname: Option<String>,
    /// Primary outbound IP address
    pub ip_address: Option<String>,
}

/// Collect hostname then address, stopping at the first failure.
///
/// Mirrors the metric collector's contract: errors are logged, never
/// returned.
#[must_use]
pub fn collect_identity() -> IdentitySample {
    let mut sample = IdentitySample::default();

    match hostname::get() {
        Ok(name) => sample.hostname = Some(name.to_string_lossy().into_owned()),
        Err(e) => {
            error!(error = %e, field = "hostname", "identity collection stopped");
            return sample;
        }
    }
    match primary_address() {
        Ok(addr) => sample.ip_address = Some(addr.to_string()),
        Err(e) => {
            error!(error = %e, field = "ip_address", "identity collection stopped");
        }
    }

    sample
}

/// The address the host would route external traffic from.
///
/// Connecting a UDP socket performs only a routing lookup; no packet is
/// sent.
fn primary_address() -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .map_err(|e| AgentError::Collection(format!("udp bind: {e}")))?;
    socket
        .connect("8.8.8.8:80")
        .map_err(|e| AgentError::Collection(format!("udp connect: {e}")))?;
    let addr = socket
        .local_addr()
        .map_err(|e| AgentError::Collection(format!("local addr: {e}")))?;
    Ok(addr.ip())
}
