//! The collection scheduler: one loop, one cycle at a time.
//!
//! On entry the scheduler starts the snapshot server exactly once and loads
//! the vulnerability database exactly once (a reload is an explicit
//! operation, never automatic). Each cycle then walks
//! `Sampling -> Correlating -> Signing -> Persisting`; a failed stage
//! abandons the cycle with a typed outcome, and the loop unconditionally
//! sleeps and restarts. The sleep is measured after the cycle body, so the
//! wall-clock period is cycle time plus the configured interval.

use netpulse_core::{AgentError, Result, SignedEnvelope, TelemetrySnapshot};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::AgentConfig;
use crate::correlate::Correlator;
use crate::cvedb::{DatabaseHandle, LoadOptions};
use crate::writer::WrittenFiles;
use crate::{sampler, server, sign, writer};

/// The stage a cycle is in, and the unit failures are attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    /// Host metric and identity collection
    Sampling,
    /// Vulnerability correlation against the database
    Correlating,
    /// Canonical serialization and HMAC
    Signing,
    /// Writing the envelope files
    Persisting,
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sampling => write!(f, "sampling"),
            Self::Correlating => write!(f, "correlating"),
            Self::Signing => write!(f, "signing"),
            Self::Persisting => write!(f, "persisting"),
        }
    }
}

/// Typed result of one cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// All stages ran and the envelope was written. `partial` is true when
    /// at least one snapshot field failed to collect; a partial snapshot is
    /// still persisted, never discarded.
    Persisted {
        /// Files written this cycle
        files: WrittenFiles,
        /// Whether any snapshot field was missing
        partial: bool,
        /// Services that appeared in the correlation result
        matched_services: usize,
    },
    /// A stage failed; nothing was persisted and the loop moves on.
    Abandoned {
        /// Stage the failure is attributed to
        stage: CycleStage,
        /// What went wrong
        error: AgentError,
    },
}

/// Drives collection cycles and owns the snapshot server's lifetime.
#[derive(Debug)]
pub struct Scheduler {
    config: AgentConfig,
    database: DatabaseHandle,
    correlator: Correlator,
}

impl Scheduler {
    /// Build a scheduler, running the fatal startup configuration check.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if the secret key is missing.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            database: DatabaseHandle::new(),
            correlator: Correlator::new(),
        })
    }

    /// Handle to the live vulnerability database.
    #[must_use]
    pub const fn database(&self) -> &DatabaseHandle {
        &self.database
    }

    /// Explicitly replace the database from the configured path.
    ///
    /// The swap is atomic with respect to a correlation already in
    /// progress: that correlation keeps the mapping it started with.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Database` if the file cannot be read; the
    /// previous mapping stays in place.
    pub fn reload_database(&self) -> Result<usize> {
        self.database
            .reload(&self.config.database_path, &LoadOptions::default())
    }

    /// Run forever: start the server, load the database, then cycle.
    ///
    /// A database load failure is logged and leaves the database empty
    /// (correlation yields empty counts); a cycle failure is logged and the
    /// loop continues. Only the initial server bind can end this function.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Server` if the snapshot server cannot bind at
    /// startup.
    pub async fn run(self) -> Result<()> {
        let _server = server::spawn(self.config.data_dir.clone(), self.config.serve_port).await?;

        if let Err(e) = self.reload_database() {
            warn!(error = %e, "continuing with an empty vulnerability database");
        }

        info!(
            interval_secs = self.config.interval_secs,
            data_dir = %self.config.data_dir.display(),
            "collection loop started"
        );

        loop {
            match self.run_cycle().await {
                CycleOutcome::Persisted {
                    files,
                    partial,
                    matched_services,
                } => {
                    info!(
                        latest = %files.latest.display(),
                        partial,
                        matched_services,
                        "cycle persisted"
                    );
                }
                CycleOutcome::Abandoned { stage, error } => {
                    error!(stage = %stage, error = %error, "cycle abandoned");
                }
            }
            tokio::time::sleep(Duration::from_secs(self.config.interval_secs)).await;
        }
    }

    /// One full cycle: sample, then hand off to the synchronous tail.
    async fn run_cycle(&self) -> CycleOutcome {
        let sampled = tokio::task::spawn_blocking(|| {
            let metrics = sampler::collect_system_metrics();
            let identity = sampler::collect_identity();
            (metrics, identity)
        })
        .await;

        let (mut snapshot, identity) = match sampled {
            Ok(pair) => pair,
            Err(e) => {
                return CycleOutcome::Abandoned {
                    stage: CycleStage::Sampling,
                    error: AgentError::Collection(format!("sampler task: {e}")),
                }
            }
        };
        snapshot.hostname = identity.hostname;
        snapshot.ip_address = identity.ip_address;

        self.finish_cycle(snapshot)
    }

    /// Correlate, sign, and persist an already-sampled snapshot.
    fn finish_cycle(&self, mut snapshot: TelemetrySnapshot) -> CycleOutcome {
        let partial = !snapshot.is_complete();

        // Correlating. Infallible by contract: empty inputs yield empty
        // counts.
        let database = self.database.current();
        let counts = self
            .correlator
            .count_matches(snapshot.connections.as_deref().unwrap_or(&[]), &database);
        snapshot.vuln_counts = counts;
        let matched_services = snapshot.vuln_counts.len();

        // Signing. The digest covers this exact canonical text.
        let text = match snapshot.canonical_json() {
            Ok(text) => text,
            Err(e) => {
                return CycleOutcome::Abandoned {
                    stage: CycleStage::Signing,
                    error: e.into(),
                }
            }
        };
        let digest = sign::sign(&text, &self.config.secret_key);
        let envelope = SignedEnvelope {
            data: snapshot,
            hmac: digest,
        };

        // Persisting.
        match writer::write_envelope(&self.config.data_dir, &envelope) {
            Ok(files) => CycleOutcome::Persisted {
                files,
                partial,
                matched_services,
            },
            Err(error) => CycleOutcome::Abandoned {
                stage: CycleStage::Persisting,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_core::Connection;
    use std::io::Write;

    fn test_scheduler(data_dir: &std::path::Path, db: &std::path::Path) -> Scheduler {
        let mut config = AgentConfig::new("k");
        config.interval_secs = 1;
        config.data_dir = data_dir.to_path_buf();
        config.database_path = db.to_path_buf();
        Scheduler::new(config).unwrap()
    }

    fn ssh_snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            connections: Some(vec![Connection {
                local_addr: "0.0.0.0".into(),
                local_port: 22,
                state: "LISTEN".into(),
            }]),
            hostname: Some("node1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_secret_key_refuses_to_start() {
        let err = Scheduler::new(AgentConfig::new("")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_finish_cycle_correlates_signs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = tempfile::NamedTempFile::new().unwrap();
        writeln!(db, "CVE-1;openssh 8.2p1 before 8.3").unwrap();

        let scheduler = test_scheduler(dir.path(), db.path());
        scheduler.reload_database().unwrap();

        let outcome = scheduler.finish_cycle(ssh_snapshot());
        let CycleOutcome::Persisted {
            files,
            partial,
            matched_services,
        } = outcome
        else {
            panic!("cycle should persist");
        };
        assert!(partial);
        assert_eq!(matched_services, 1);

        let envelope: SignedEnvelope =
            serde_json::from_str(&std::fs::read_to_string(&files.latest).unwrap()).unwrap();
        assert_eq!(envelope.data.vuln_counts.get("openssh"), Some(&1));

        // The digest verifies against the re-serialized data with the right
        // key, and against nothing else.
        let text = envelope.data.canonical_json().unwrap();
        assert!(sign::verify(&text, "k", &envelope.hmac));
        assert!(!sign::verify(&text, "wrong", &envelope.hmac));
    }

    #[test]
    fn test_empty_database_yields_empty_counts_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = test_scheduler(dir.path(), std::path::Path::new("/nonexistent/cve.csv"));
        assert!(scheduler.reload_database().is_err());

        let outcome = scheduler.finish_cycle(ssh_snapshot());
        let CycleOutcome::Persisted { files, .. } = outcome else {
            panic!("cycle should persist");
        };
        let envelope: SignedEnvelope =
            serde_json::from_str(&std::fs::read_to_string(&files.latest).unwrap()).unwrap();
        assert_eq!(envelope.data.vuln_counts.get("openssh"), Some(&0));
    }

    #[test]
    fn test_unwritable_data_dir_abandons_at_persisting() {
        let db = tempfile::NamedTempFile::new().unwrap();
        let scheduler =
            test_scheduler(std::path::Path::new("/nonexistent/data"), db.path());

        let outcome = scheduler.finish_cycle(ssh_snapshot());
        let CycleOutcome::Abandoned { stage, .. } = outcome else {
            panic!("cycle should abandon");
        };
        assert_eq!(stage, CycleStage::Persisting);
    }

    /// Two consecutive cycles leave two distinct timestamped files plus a
    /// verifying `latest.json`.
    #[tokio::test]
    async fn test_two_cycles_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = tempfile::NamedTempFile::new().unwrap();
        writeln!(db, "CVE-1;openssh 8.2p1 before 8.3").unwrap();

        let scheduler = test_scheduler(dir.path(), db.path());
        scheduler.reload_database().unwrap();

        let first = scheduler.run_cycle().await;
        assert!(matches!(first, CycleOutcome::Persisted { .. }));
        // Timestamped filenames have second resolution.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let second = scheduler.run_cycle().await;
        assert!(matches!(second, CycleOutcome::Persisted { .. }));

        let mut timestamped = 0;
        let mut latest = 0;
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            if name.starts_with("network_agent_data_") {
                timestamped += 1;
            } else if name == writer::LATEST_FILENAME {
                latest += 1;
            }
        }
        assert_eq!(timestamped, 2);
        assert_eq!(latest, 1);

        let envelope: SignedEnvelope = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(writer::LATEST_FILENAME)).unwrap(),
        )
        .unwrap();
        let text = envelope.data.canonical_json().unwrap();
        assert!(sign::verify(&text, "k", &envelope.hmac));
        assert!(!sign::verify(&text, "not-k", &envelope.hmac));
    }
}
