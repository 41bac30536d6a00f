//! Vulnerability database ingestion.
//!
//! The source is a large semicolon-delimited text file: first field is the
//! identifier, every remaining field rejoined with `;` is the description.
//! Rows are folded into the mapping in fixed-size chunks so the file is
//! never held in memory as a list of rows. Field bytes are decoded lossily
//! (the dataset is not clean UTF-8); a decoding problem replaces characters,
//! it never fails the load. Only file-level errors are fatal to a load.

use csv::ByteRecord;
use netpulse_core::{AgentError, Result, VulnDatabase, VulnRecord};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::correlate::Correlator;

/// Rows folded into the mapping per batch.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Marker for identifiers that are allocated but carry no description yet.
const RESERVED_MARKER: &str = "** RESERVED **";

/// Loading policy knobs.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rows accumulated before a chunk is folded into the mapping.
    pub chunk_size: usize,
    /// Drop rows whose description is a reserved placeholder. Used by the
    /// stricter processing path; the agent's own load keeps them.
    pub skip_reserved: bool,
    /// Run software name/version extraction over each description and store
    /// the result on the record. Also a stricter-path policy.
    pub extract_software: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_reserved: false,
            extract_software: false,
        }
    }
}

impl LoadOptions {
    /// The stricter processing path: no placeholders, extraction on.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_reserved: true,
            extract_software: true,
        }
    }
}

/// Load a vulnerability database from `path`.
///
/// Row-level malformation never fails the load: a row with fewer than two
/// fields is skipped with a warning. Duplicate identifiers resolve to the
/// last occurrence in the source.
///
/// # Errors
///
/// Returns `AgentError::Database` only when the file itself cannot be
/// opened or read.
pub fn load_database(path: &Path, options: &LoadOptions) -> Result<VulnDatabase> {
    let file = std::fs::File::open(path).map_err(|e| AgentError::Database {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(std::io::BufReader::new(file));

    let extractor = options.extract_software.then(Correlator::new);

    let mut mapping = VulnDatabase::new();
    let mut chunk: Vec<(String, String)> = Vec::with_capacity(options.chunk_size);
    let mut record = ByteRecord::new();

    loop {
        let more = reader
            .read_byte_record(&mut record)
            .map_err(|e| AgentError::Database {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if !more {
            break;
        }

        if record.len() < 2 {
            let row: Vec<String> = record
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect();
            warn!(row = ?row, "skipping malformed row");
            continue;
        }

        let id = String::from_utf8_lossy(&record[0]).into_owned();
        let description = record
            .iter()
            .skip(1)
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect::<Vec<_>>()
            .join(";");

        if options.skip_reserved && description.contains(RESERVED_MARKER) {
            continue;
        }

        chunk.push((id, description));
        if chunk.len() >= options.chunk_size {
            fold_chunk(&mut chunk, &mut mapping, extractor.as_ref());
        }
    }
    fold_chunk(&mut chunk, &mut mapping, extractor.as_ref());

    Ok(mapping)
}

/// Drain one chunk of rows into the mapping. Later rows overwrite earlier
/// ones with the same identifier.
fn fold_chunk(
    chunk: &mut Vec<(String, String)>,
    mapping: &mut VulnDatabase,
    extractor: Option<&Correlator>,
) {
    for (id, description) in chunk.drain(..) {
        let mut record = VulnRecord::new(description);
        if let Some(correlator) = extractor {
            if let Some((name, version)) = correlator.extract_software(&record.description) {
                record.software_name = Some(name);
                record.software_version = Some(version);
            }
        }
        mapping.insert(id, record);
    }
}

/// Shared handle to the live database.
///
/// Correlation reads grab the current `Arc`; a reload builds a complete new
/// mapping and swaps it in one store, so an in-progress correlation keeps
/// the map it started with and never observes a half-built one.
#[derive(Debug, Clone, Default)]
pub struct DatabaseHandle {
    inner: Arc<RwLock<Arc<VulnDatabase>>>,
}

impl DatabaseHandle {
    /// An empty handle; the database stays empty until the first reload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The database as of this call.
    #[must_use]
    pub fn current(&self) -> Arc<VulnDatabase> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the whole database from `path`. On failure the previous
    /// mapping stays in place untouched.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Database` when the file cannot be read.
    pub fn reload(&self, path: &Path, options: &LoadOptions) -> Result<usize> {
        let database = load_database(path, options)?;
        let entries = database.len();
        match self.inner.write() {
            Ok(mut guard) => *guard = Arc::new(database),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(database),
        }
        info!(path = %path.display(), entries, "vulnerability database loaded");
        Ok(entries)
    }
}
