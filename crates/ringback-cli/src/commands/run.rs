use crate::commands::{print_json, source_path, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use ringback_config::AppConfig;
use ringback_core::{Contact, Outcome};
use ringback_lookup::serper::{SearchOptions, SerperSource};
use ringback_lookup::webdriver::{BrowserOptions, WebDriverLookup};
use ringback_lookup::MatchingPipeline;
use ringback_store::{CheckpointStore, ContactReport, Disposition, RunSummary};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// CSV with `email` and `first_name` columns; prompted for when omitted
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Process at most this many pending contacts
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    source: String,
    results: String,
    results_created: bool,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

pub fn run(ctx: &Context<'_>, args: RunArgs) -> Result<()> {
    let source = source_path(args.input)?;
    let results = ctx.results_path(args.results);

    let mut store = CheckpointStore::open(&source, &results)?;

    if !ctx.json {
        if store.results().created() {
            println!("Created {} file", results.display());
        } else {
            println!("Using existing {} file", results.display());
        }
        println!("Processing {} records...", store.pending().len());
    }

    let summary = if store.pending().is_empty() {
        debug!("no pending contacts");
        RunSummary::default()
    } else {
        let search = SerperSource::new(search_options(ctx.config)?)
            .with_context(|| "configure snippet search")?;
        let lookup = WebDriverLookup::new(browser_options(ctx.config))
            .with_context(|| "configure name lookup")?;
        lookup.ready().with_context(|| {
            format!(
                "webdriver at {} is not accepting sessions",
                ctx.config.lookup.webdriver_url
            )
        })?;
        let pipeline = MatchingPipeline::new(search, lookup);

        let json = ctx.json;
        store.run(
            args.limit,
            |contact: &Contact| {
                if !json {
                    println!("Processing: {} - {}", contact.first_name, contact.email);
                }
                pipeline.process(contact)
            },
            |report| {
                if !json {
                    print_progress(report);
                }
            },
        )
    };

    if ctx.json {
        print_json(&RunReport {
            source: source.display().to_string(),
            results: results.display().to_string(),
            results_created: store.results().created(),
            summary: &summary,
        })?;
    } else {
        print_summary(&summary);
    }

    if !summary.unsaved.is_empty() {
        return Err(anyhow!(
            "{} match(es) could not be written to {}",
            summary.unsaved.len(),
            results.display()
        ));
    }
    if summary.source_stale {
        return Err(anyhow!(
            "{} could not be rewritten; processed contacts are still listed",
            source.display()
        ));
    }
    Ok(())
}

fn search_options(config: &AppConfig) -> Result<SearchOptions> {
    Ok(SearchOptions {
        endpoint: config.search.endpoint.clone(),
        api_key: config.search.resolve_api_key()?,
        query_suffix: config.search.query_suffix.clone(),
        timeout: Duration::from_secs(config.search.timeout_secs),
    })
}

fn browser_options(config: &AppConfig) -> BrowserOptions {
    let lookup = &config.lookup;
    BrowserOptions {
        webdriver_url: lookup.webdriver_url.clone(),
        page_url: lookup.page_url.clone(),
        name_xpath: lookup.name_xpath.clone(),
        page_load_wait: Duration::from_millis(lookup.page_load_wait_ms),
        user_agent: lookup.user_agent.clone(),
        headless: lookup.headless,
        timeout: Duration::from_secs(lookup.timeout_secs),
    }
}

fn print_progress(report: &ContactReport<'_>) {
    match (report.outcome, report.disposition) {
        (Outcome::Matched(record), Disposition::Saved) => {
            println!(
                "  SUCCESS: {} -> {}",
                record.first_name, record.phone_number
            );
        }
        (Outcome::Matched(record), _) => {
            println!(
                "  UNSAVED: {} -> {} (kept pending)",
                record.first_name, record.phone_number
            );
        }
        (Outcome::TransientError(reason), _) => {
            println!("  Kept for retry: {}", reason);
        }
        (outcome, _) => {
            let label = outcome
                .unmatched_reason()
                .map(|reason| reason.label())
                .unwrap_or("unmatched");
            println!("  Removed: {}", label);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Process completed!");
    println!(
        "Processed {} contacts: {} matched, {} unmatched, {} kept for retry",
        summary.processed,
        summary.matched,
        summary.unmatched(),
        summary.retry
    );
    if !summary.unsaved.is_empty() {
        println!("Unsaved matches:");
        for record in &summary.unsaved {
            println!("- {},{}", record.first_name, record.phone_number);
        }
    }
    println!("Remaining pending contacts: {}", summary.remaining);
}
