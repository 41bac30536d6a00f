//! `netpulse verify` - check a persisted envelope against the secret key.
//!
//! Verification re-serializes the envelope's `data` through the same
//! canonical serialization the signer used; comparing logical data would
//! not be enough, since whitespace and field order are signed content.

use anyhow::{bail, Context, Result};
use netpulse_agent::sign;
use netpulse_core::SignedEnvelope;

use crate::cli::args::VerifyArgs;

pub fn execute(args: &VerifyArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let envelope: SignedEnvelope =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", args.file.display()))?;

    let text = envelope.data.canonical_json()?;
    if sign::verify(&text, &args.secret_key, &envelope.hmac) {
        println!("{}: OK", args.file.display());
        Ok(())
    } else {
        bail!("{}: digest verification FAILED", args.file.display());
    }
}
