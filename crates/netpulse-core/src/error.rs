use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur while the agent is running
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration is invalid or a required setting is missing.
    /// The only error class that aborts startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Vulnerability database file could not be opened or read.
    /// Leaves the database empty; correlation then yields empty counts.
    #[error("vulnerability database {path}: {reason}")]
    Database {
        /// Path that failed to load
        path: String,
        /// What went wrong at the file level
        reason: String,
    },

    /// A host metric call failed mid-collection.
    /// The snapshot keeps already-collected fields and omits the rest.
    #[error("metric collection failed: {0}")]
    Collection(String),

    /// Snapshot server failed to bind or serve.
    #[error("snapshot server error: {0}")]
    Server(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Returns true if the error must abort startup rather than be
    /// absorbed by the cycle loop
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the error only degrades a single cycle
    #[must_use]
    pub const fn is_cycle_error(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(AgentError::Config("SECRET_KEY not set".into()).is_fatal());
        assert!(!AgentError::Collection("cpu".into()).is_fatal());
        assert!(AgentError::Server("bind".into()).is_cycle_error());
    }

    #[test]
    fn database_error_names_the_path() {
        let err = AgentError::Database {
            path: "cve.csv".into(),
            reason: "No such file or directory".into(),
        };
        assert!(err.to_string().contains("cve.csv"));
    }
}
