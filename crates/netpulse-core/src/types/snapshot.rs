//! Telemetry snapshot -- one cycle's aggregated, possibly partial, host state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Memory statistics in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total physical memory
    pub total: u64,
    /// Memory available to new allocations
    pub available: u64,
    /// Memory in use
    pub used: u64,
    /// Completely unused memory
    pub free: u64,
}

/// Disk usage for the root filesystem, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStats {
    /// Mount point the stats were read from
    pub mount_point: String,
    /// Total capacity
    pub total: u64,
    /// Space in use
    pub used: u64,
    /// Space still available
    pub available: u64,
}

/// Cumulative network interface counters, summed across interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    /// Bytes sent since boot
    pub bytes_sent: u64,
    /// Bytes received since boot
    pub bytes_recv: u64,
    /// Packets sent since boot
    pub packets_sent: u64,
    /// Packets received since boot
    pub packets_recv: u64,
    /// Receive errors
    pub errors_in: u64,
    /// Transmit errors
    pub errors_out: u64,
}

/// System load average over one, five, and fifteen minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    /// One-minute average
    pub one: f64,
    /// Five-minute average
    pub five: f64,
    /// Fifteen-minute average
    pub fifteen: f64,
}

/// One local socket, sampled fresh from the host each cycle.
///
/// Never persisted on its own -- only embedded in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Local address the socket is bound to
    pub local_addr: String,
    /// Local port
    pub local_port: u16,
    /// Socket state (e.g. `LISTEN`, `ESTABLISHED`)
    pub state: String,
}

/// One cycle's aggregated telemetry.
///
/// Every metric field is independently optional: a collection failure leaves
/// the field (and all fields after it in sampling order) absent rather than
/// null-filled. A partial snapshot is always preferred over no snapshot.
///
/// Field order here is load-bearing: the signer's digest covers this struct's
/// serialization, so reordering fields invalidates previously signed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Global CPU usage percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f32>,

    /// Memory statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryStats>,

    /// Root filesystem usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskStats>,

    /// Network interface counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_io: Option<NetworkCounters>,

    /// Load average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_avg: Option<LoadAverage>,

    /// Local TCP sockets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,

    /// Host name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Primary outbound IP address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Vulnerability description matches per fingerprinted service
    #[serde(default)]
    pub vuln_counts: BTreeMap<String, u32>,
}

impl TelemetrySnapshot {
    /// The exact serialization the integrity signer operates on.
    ///
    /// Whitespace and field order in this text are part of the signed
    /// content: verification must re-serialize through this same function,
    /// not merely compare logical data.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Returns true if every metric and identity field was collected
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.cpu_usage.is_some()
            && self.memory.is_some()
            && self.disk.is_some()
            && self.network_io.is_some()
            && self.load_avg.is_some()
            && self.connections.is_some()
            && self.hostname.is_some()
            && self.ip_address.is_some()
    }

    /// Returns true if no metric or identity field was collected
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cpu_usage.is_none()
            && self.memory.is_none()
            && self.disk.is_none()
            && self.network_io.is_none()
            && self.load_avg.is_none()
            && self.connections.is_none()
            && self.hostname.is_none()
            && self.ip_address.is_none()
    }
}
