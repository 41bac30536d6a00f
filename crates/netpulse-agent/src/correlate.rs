//! Cross-referencing open services against vulnerability descriptions.
//!
//! The matching here is a text heuristic, not CPE-grade matching: a service
//! counts against a record when the expected name is a substring of an
//! extracted candidate name AND the expected version is a substring of the
//! extracted candidate version. Substrings overcount ("ssh" matches
//! "openssh-portable"); version formatting differences undercount. Both are
//! accepted properties of the heuristic, kept permissive on purpose.

use netpulse_core::{Connection, VulnDatabase};
use regex::Regex;
use std::collections::BTreeMap;

use crate::fingerprint;

/// A dotted version number, optionally with an alphanumeric suffix on the
/// second component (`8.2p1`) and further dotted components (`1.2.3.4`).
const VERSION: &str = r"[0-9]+\.[0-9]+[a-z0-9]*(?:\.[0-9]+)*";

/// Words that a bare name capture may not be.
const STOP_WORDS: &[&str] = &["before", "version", "v"];

/// Correlates the live connection table against the vulnerability database.
#[derive(Debug)]
pub struct Correlator {
    patterns: Vec<Regex>,
}

impl Correlator {
    /// Compile the permissive extraction patterns: a software token followed
    /// by a dotted version, optionally joined by `version` or `v`, optionally
    /// with a trailing parenthetical.
    #[must_use]
    pub fn new() -> Self {
        let sources = [
            format!(r"([a-zA-Z0-9_-]+)\s+({VERSION})"),
            format!(r"([a-zA-Z0-9_-]+)\s+version\s+({VERSION})"),
            format!(r"([a-zA-Z0-9_-]+)\s+v({VERSION})"),
            format!(r"([a-zA-Z0-9_-]+)\s+({VERSION}\s+\([^)]*\))"),
        ];
        let patterns = sources
            .iter()
            .map(|src| Regex::new(src).expect("valid software pattern"))
            .collect();
        Self { patterns }
    }

    /// All candidate (name, version) pairs found in a description.
    fn extract_all<'d>(&self, description: &'d str) -> Vec<(&'d str, &'d str)> {
        let mut pairs = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(description) {
                if let (Some(name), Some(version)) = (caps.get(1), caps.get(2)) {
                    pairs.push((name.as_str(), version.as_str()));
                }
            }
        }
        pairs
    }

    /// First extracted (name, version) pair whose name is not a bare
    /// stop-word. Used by the stricter database-loading path to enrich
    /// records; `None` when nothing plausible matches.
    #[must_use]
    pub fn extract_software(&self, description: &str) -> Option<(String, String)> {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.captures(description) {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let version = caps.get(2).map_or("", |m| m.as_str());
                if !STOP_WORDS.contains(&name.to_lowercase().as_str()) {
                    return Some((name.to_string(), version.to_string()));
                }
            }
        }
        None
    }

    /// Per-service match counts for the current connection table.
    ///
    /// Only connections on fingerprinted ports participate; everything else
    /// is absent from the result. An empty connection table or an empty
    /// database yields an empty map, never an error.
    #[must_use]
    pub fn count_matches(
        &self,
        connections: &[Connection],
        database: &VulnDatabase,
    ) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();

        for conn in connections {
            let Some(fp) = fingerprint::fingerprint_for(conn.local_port) else {
                continue;
            };

            // Recounted from zero per sighting; duplicate connections on one
            // port land on the same tally.
            let tally = counts.entry(fp.service.to_string()).or_insert(0);
            *tally = 0;
            for record in database.values() {
                for (name, version) in self.extract_all(&record.description) {
                    if name.contains(fp.service) && version.contains(fp.version) {
                        *tally += 1;
                    }
                }
            }
        }

        counts
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_core::VulnRecord;

    fn conn(port: u16) -> Connection {
        Connection {
            local_addr: "0.0.0.0".into(),
            local_port: port,
            state: "LISTEN".into(),
        }
    }

    fn db(entries: &[(&str, &str)]) -> VulnDatabase {
        entries
            .iter()
            .map(|(id, desc)| ((*id).to_string(), VulnRecord::new((*desc).to_string())))
            .collect()
    }

    #[test]
    fn test_fingerprinted_port_matches_description() {
        let correlator = Correlator::new();
        let database = db(&[("CVE-1", "openssh 8.2p1 before 8.3 allows remote attackers")]);

        let counts = correlator.count_matches(&[conn(22)], &database);
        assert_eq!(counts.get("openssh"), Some(&1));
    }

    #[test]
    fn test_no_fingerprinted_port_yields_empty_map() {
        let correlator = Correlator::new();
        let database = db(&[("CVE-1", "openssh 8.2p1 before 8.3")]);

        assert!(correlator.count_matches(&[conn(9999)], &database).is_empty());
        assert!(correlator.count_matches(&[], &database).is_empty());
    }

    #[test]
    fn test_version_mismatch_does_not_count() {
        let correlator = Correlator::new();
        let database = db(&[("CVE-1", "openssh 7.4 remote code execution")]);

        let counts = correlator.count_matches(&[conn(22)], &database);
        // Port 22 was sighted so the service appears, with zero matches.
        assert_eq!(counts.get("openssh"), Some(&0));
    }

    #[test]
    fn test_substring_matching_is_permissive() {
        let correlator = Correlator::new();
        // Name need only contain the expected name.
        let database = db(&[("CVE-1", "openssh-portable 8.2p1 privilege escalation")]);

        let counts = correlator.count_matches(&[conn(22)], &database);
        assert_eq!(counts.get("openssh"), Some(&1));
    }

    #[test]
    fn test_counts_accumulate_across_records() {
        let correlator = Correlator::new();
        let database = db(&[
            ("CVE-1", "nginx 1.18.0 request smuggling"),
            ("CVE-2", "nginx 1.18.0 resolver off-by-one"),
            ("CVE-3", "apache httpd 2.4.41 mod_proxy issue"),
        ]);

        let counts = correlator.count_matches(&[conn(443), conn(80)], &database);
        assert_eq!(counts.get("nginx"), Some(&2));
        assert_eq!(counts.get("httpd"), Some(&1));
    }

    #[test]
    fn test_duplicate_connections_on_one_port_do_not_double_count() {
        let correlator = Correlator::new();
        let database = db(&[("CVE-1", "nginx 1.18.0 request smuggling")]);

        let counts = correlator.count_matches(&[conn(443), conn(443)], &database);
        assert_eq!(counts.get("nginx"), Some(&1));
    }

    #[test]
    fn test_extract_software_prefers_real_names_over_stop_words() {
        let correlator = Correlator::new();

        let pair = correlator.extract_software("apache version 2.4.41 mod_lua");
        assert_eq!(pair, Some(("apache".to_string(), "2.4.41".to_string())));

        let pair = correlator.extract_software("nginx v1.18.0 resolver");
        assert_eq!(pair, Some(("nginx".to_string(), "1.18.0".to_string())));

        assert_eq!(correlator.extract_software("fixed before 2.0 only"), None);
        assert_eq!(correlator.extract_software("no version mentioned"), None);
    }

    #[test]
    fn test_extract_software_keeps_version_suffixes() {
        let correlator = Correlator::new();
        let pair = correlator.extract_software("openssh 8.2p1 before 8.3");
        assert_eq!(pair, Some(("openssh".to_string(), "8.2p1".to_string())));
    }
}
