//! Keyed snapshot authentication via `ring::hmac`.
//!
//! The digest is computed over the snapshot's canonical serialization, so
//! whitespace and field order are part of the signed content: verification
//! must reproduce the identical text, not merely the same logical data.

use ring::hmac;

/// HMAC-SHA256 digest of `text` under `key`, as lowercase hex.
///
/// Deterministic: identical (text, key) pairs always produce the same
/// digest.
#[must_use]
pub fn sign(text: &str, key: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    let tag = hmac::sign(&key, text.as_bytes());
    hex::encode(tag.as_ref())
}

/// Check `digest` against the HMAC-SHA256 of `text` under `key`.
///
/// Comparison happens in constant time inside `ring`. A digest that is not
/// valid hex simply fails verification.
#[must_use]
pub fn verify(text: &str, key: &str, digest: &str) -> bool {
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    hmac::verify(&key, text.as_bytes(), &expected).is_ok()
}
