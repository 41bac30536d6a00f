//! The persisted pair of a snapshot and its authentication digest.

use serde::{Deserialize, Serialize};

use super::snapshot::TelemetrySnapshot;

/// A snapshot plus the HMAC digest over its canonical serialization.
///
/// The pair is only self-consistent if verification reproduces the exact
/// serialization produced by [`TelemetrySnapshot::canonical_json`]; the
/// digest is not a function of the logical data alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// The telemetry snapshot
    pub data: TelemetrySnapshot,
    /// Lowercase hex HMAC-SHA256 over the snapshot's canonical JSON
    pub hmac: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = SignedEnvelope {
            data: TelemetrySnapshot {
                hostname: Some("node1".into()),
                ..Default::default()
            },
            hmac: "ab".repeat(32),
        };
        let json = serde_json::to_string_pretty(&envelope).unwrap();
        let parsed: SignedEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
        // The inner snapshot re-serializes to the same canonical text.
        assert_eq!(
            parsed.data.canonical_json().unwrap(),
            envelope.data.canonical_json().unwrap()
        );
    }
}
