//! Static service assumptions for well-known ports.

/// Expected (service, version) behind a well-known port.
///
/// Fixed at build time, not learned from observed traffic; the correlator
/// treats these as the software presumed to be listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceFingerprint {
    /// Service name as it appears in vulnerability descriptions
    pub service: &'static str,
    /// Version string presumed deployed
    pub version: &'static str,
}

/// Port-to-service table.
const PORT_FINGERPRINTS: &[(u16, ServiceFingerprint)] = &[
    (
        22,
        ServiceFingerprint {
            service: "openssh",
            version: "8.2p1",
        },
    ),
    (
        80,
        ServiceFingerprint {
            service: "httpd",
            version: "2.4.41",
        },
    ),
    (
        443,
        ServiceFingerprint {
            service: "nginx",
            version: "1.18.0",
        },
    ),
];

/// Fingerprint for `port`, if it is a known service port.
#[must_use]
pub fn fingerprint_for(port: u16) -> Option<ServiceFingerprint> {
    PORT_FINGERPRINTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, fp)| *fp)
}
