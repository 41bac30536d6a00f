//! netpulse - host telemetry agent CLI.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    netpulse_cli::run().await
}
