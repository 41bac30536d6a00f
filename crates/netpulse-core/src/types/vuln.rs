//! Vulnerability records and the in-memory database mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One vulnerability entry keyed by its dataset identifier.
///
/// The extended fields are only populated by the stricter loading path that
/// runs software extraction over the description; they stay `None` when no
/// pattern matches or extraction was not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnRecord {
    /// Raw free-text description, exactly as rejoined from the source row
    pub description: String,

    /// Software name extracted from the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,

    /// Software version extracted from the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
}

impl VulnRecord {
    /// Record with only a raw description
    #[must_use]
    pub const fn new(description: String) -> Self {
        Self {
            description,
            software_name: None,
            software_version: None,
        }
    }
}

/// Mapping from vulnerability identifier to its record.
///
/// Built once per load and never mutated afterwards; a reload replaces the
/// whole mapping. Duplicate identifiers in the source resolve to the last
/// occurrence.
pub type VulnDatabase = HashMap<String, VulnRecord>;
