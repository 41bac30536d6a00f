//! Envelope persistence.
//!
//! Every cycle produces two files with identical content: a timestamped
//! file that is never overwritten, and `latest.json`, replaced every cycle.
//! Both are written to a temporary file in the target directory and then
//! renamed into place, so a concurrent reader observes the previous
//! complete envelope or the new complete envelope, never a torn file.

use chrono::Utc;
use netpulse_core::{AgentError, Result, SignedEnvelope};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Fixed name of the most-recent-cycle file.
pub const LATEST_FILENAME: &str = "latest.json";

/// Prefix of the per-cycle files.
const SNAPSHOT_PREFIX: &str = "network_agent_data_";

/// Timestamp format used in per-cycle filenames.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Paths produced by one persistence pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// The never-overwritten per-cycle file
    pub timestamped: PathBuf,
    /// The atomically replaced `latest.json`
    pub latest: PathBuf,
}

/// Persist an envelope to `dir`.
///
/// # Errors
///
/// Returns `AgentError::Json` if the envelope fails to serialize, or
/// `AgentError::Io` if either file cannot be written.
pub fn write_envelope(dir: &Path, envelope: &SignedEnvelope) -> Result<WrittenFiles> {
    let json = serde_json::to_string_pretty(envelope)?;

    let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
    let timestamped = dir.join(format!("{SNAPSHOT_PREFIX}{timestamp}.json"));
    write_atomic(dir, &timestamped, json.as_bytes())?;

    let latest = dir.join(LATEST_FILENAME);
    write_atomic(dir, &latest, json.as_bytes())?;

    debug!(
        timestamped = %timestamped.display(),
        bytes = json.len(),
        "envelope persisted"
    );
    Ok(WrittenFiles { timestamped, latest })
}

/// Write `bytes` to `target` via a sibling temp file and an atomic rename.
///
/// The temp file lives in the same directory as the target so the rename
/// never crosses filesystems.
fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(target).map_err(|e| AgentError::Io(e.error))?;
    Ok(())
}
