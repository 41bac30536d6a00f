//! OS metric collection via `sysinfo`, plus the socket table via `/proc`.

use netpulse_core::{
    AgentError, Connection, DiskStats, LoadAverage, MemoryStats, NetworkCounters, Result,
    TelemetrySnapshot,
};
use sysinfo::{Disks, Networks, System};
use tracing::error;

/// Collect system metrics in fixed order: cpu, memory, disk, network
/// counters, load average, connections.
///
/// The first field whose collection fails logs the error and ends the walk;
/// already-collected fields are retained and everything after the failure
/// is simply absent. Blocks for roughly the CPU sampling window; run it off
/// the async executor.
#[must_use]
pub fn collect_system_metrics() -> TelemetrySnapshot {
    let mut snapshot = TelemetrySnapshot::default();

    match cpu_usage() {
        Ok(v) => snapshot.cpu_usage = Some(v),
        Err(e) => {
            error!(error = %e, field = "cpu_usage", "metric collection stopped");
            return snapshot;
        }
    }
    match memory() {
        Ok(v) => snapshot.memory = Some(v),
        Err(e) => {
            error!(error = %e, field = "memory", "metric collection stopped");
            return snapshot;
        }
    }
    match root_disk() {
        Ok(v) => snapshot.disk = Some(v),
        Err(e) => {
            error!(error = %e, field = "disk", "metric collection stopped");
            return snapshot;
        }
    }
    match network_counters() {
        Ok(v) => snapshot.network_io = Some(v),
        Err(e) => {
            error!(error = %e, field = "network_io", "metric collection stopped");
            return snapshot;
        }
    }
    match load_average() {
        Ok(v) => snapshot.load_avg = Some(v),
        Err(e) => {
            error!(error = %e, field = "load_avg", "metric collection stopped");
            return snapshot;
        }
    }
    match connections() {
        Ok(v) => snapshot.connections = Some(v),
        Err(e) => {
            error!(error = %e, field = "connections", "metric collection stopped");
        }
    }

    snapshot
}

/// Global CPU usage percentage over a short sampling window.
#[allow(clippy::unnecessary_wraps)]
fn cpu_usage() -> Result<f32> {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    // sysinfo needs two refreshes a minimum interval apart to compute usage.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();
    Ok(sys.global_cpu_usage())
}

#[allow(clippy::unnecessary_wraps)]
fn memory() -> Result<MemoryStats> {
    let mut sys = System::new();
    sys.refresh_memory();
    Ok(MemoryStats {
        total: sys.total_memory(),
        available: sys.available_memory(),
        used: sys.used_memory(),
        free: sys.free_memory(),
    })
}

/// Usage of the filesystem mounted at `/`, falling back to the first listed
/// disk when no root mount is reported.
fn root_disk() -> Result<DiskStats> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
        .or_else(|| disks.list().first())
        .ok_or_else(|| AgentError::Collection("no mounted disks reported".into()))?;

    let total = disk.total_space();
    let available = disk.available_space();
    Ok(DiskStats {
        mount_point: disk.mount_point().display().to_string(),
        total,
        used: total.saturating_sub(available),
        available,
    })
}

/// Interface counters summed across all interfaces.
#[allow(clippy::unnecessary_wraps)]
fn network_counters() -> Result<NetworkCounters> {
    let networks = Networks::new_with_refreshed_list();
    let mut counters = NetworkCounters::default();
    for (_name, data) in &networks {
        counters.bytes_sent += data.total_transmitted();
        counters.bytes_recv += data.total_received();
        counters.packets_sent += data.total_packets_transmitted();
        counters.packets_recv += data.total_packets_received();
        counters.errors_in += data.total_errors_on_received();
        counters.errors_out += data.total_errors_on_transmitted();
    }
    Ok(counters)
}

#[allow(clippy::unnecessary_wraps)]
fn load_average() -> Result<LoadAverage> {
    let load = System::load_average();
    Ok(LoadAverage {
        one: load.one,
        five: load.five,
        fifteen: load.fifteen,
    })
}

/// The TCP socket table from `/proc/net/tcp` and `tcp6`.
///
/// A missing IPv6 table is treated as empty; an unreadable IPv4 table fails
/// the field.
fn connections() -> Result<Vec<Connection>> {
    let mut entries =
        procfs::net::tcp().map_err(|e| AgentError::Collection(format!("/proc/net/tcp: {e}")))?;
    entries.extend(procfs::net::tcp6().unwrap_or_default());

    Ok(entries
        .into_iter()
        .map(|entry| Connection {
            local_addr: entry.local_address.ip().to_string(),
            local_port: entry.local_address.port(),
            state: format!("{:?}", entry.state).to_uppercase(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_never_panics_and_keeps_order() {
        let snapshot = collect_system_metrics();
        // Fields fail front-to-back: a later field present implies every
        // earlier field is present.
        if snapshot.connections.is_some() {
            assert!(snapshot.load_avg.is_some());
        }
        if snapshot.load_avg.is_some() {
            assert!(snapshot.network_io.is_some());
        }
        if snapshot.network_io.is_some() {
            assert!(snapshot.disk.is_some());
        }
        if snapshot.disk.is_some() {
            assert!(snapshot.memory.is_some());
        }
        if snapshot.memory.is_some() {
            assert!(snapshot.cpu_usage.is_some());
        }
    }

    #[test]
    fn test_memory_is_internally_consistent() {
        let stats = memory().unwrap();
        assert!(stats.total >= stats.used);
        assert!(stats.total >= stats.free);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_connection_states_are_uppercase() {
        let conns = connections().unwrap();
        for conn in conns {
            assert_eq!(conn.state, conn.state.to_uppercase());
        }
    }
}
