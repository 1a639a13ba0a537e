use crate::commands::{print_json, source_path, Context};
use anyhow::Result;
use clap::Args;
use ringback_store::{ResultsStore, WorkingSet};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StatusArgs {
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub results: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    source: String,
    pending: usize,
    results: String,
    stored: usize,
}

pub fn status(ctx: &Context<'_>, args: StatusArgs) -> Result<()> {
    let source = source_path(args.input)?;
    let results = ctx.results_path(args.results);

    let pending = WorkingSet::open(&source)?;
    let stored = ResultsStore::read_existing(&results)?;

    let report = StatusReport {
        source: source.display().to_string(),
        pending: pending.len(),
        results: results.display().to_string(),
        stored: stored.len(),
    };

    if ctx.json {
        return print_json(&report);
    }

    println!("Pending contacts: {} ({})", report.pending, report.source);
    println!("Stored results: {} ({})", report.stored, report.results);
    Ok(())
}
