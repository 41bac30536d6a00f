//! `netpulse run` - the agent: collection loop plus snapshot server.

use anyhow::Result;
use netpulse_agent::{AgentConfig, Scheduler};

use crate::cli::args::RunArgs;

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = AgentConfig::new(args.secret_key);
    config.interval_secs = args.interval;
    config.database_path = args.database;
    config.data_dir = args.data_dir;
    config.serve_port = args.port;

    // The fatal startup check lives in Scheduler::new; everything after
    // this point is absorbed at the cycle boundary.
    let scheduler = Scheduler::new(config)?;
    scheduler.run().await?;
    Ok(())
}
