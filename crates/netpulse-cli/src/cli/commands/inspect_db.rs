//! `netpulse inspect-db` - strict-path database load with a summary.
//!
//! Loads the database the way the strict processing path does (reserved
//! placeholders dropped, software extraction on) and prints what the agent
//! would be correlating against.

use anyhow::{Context, Result};
use netpulse_agent::cvedb::{load_database, LoadOptions};

use crate::cli::args::InspectDbArgs;

pub fn execute(args: &InspectDbArgs) -> Result<()> {
    let options = LoadOptions {
        chunk_size: args.chunk_size,
        ..LoadOptions::strict()
    };
    let database = load_database(&args.database, &options)
        .with_context(|| format!("loading {}", args.database.display()))?;

    let extracted = database
        .values()
        .filter(|record| record.software_name.is_some())
        .count();

    println!("database: {}", args.database.display());
    println!("entries: {}", database.len());
    println!("with extracted software: {extracted}");

    for (id, record) in database.iter().take(args.sample) {
        match (&record.software_name, &record.software_version) {
            (Some(name), Some(version)) => println!("  {id}: {name} {version}"),
            _ => println!("  {id}: (no extraction)"),
        }
    }

    Ok(())
}
