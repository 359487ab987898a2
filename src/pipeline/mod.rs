//! Run entry points: the portal crawl and the ledger normalization pass.
//!
//! Setup (ledger connection, initial clear, browser launch) fails fast. Once the
//! crawl starts every query and listing failure is logged and skipped, and the
//! browser is always shut down before the summary is reported.

mod crawl;
mod normalize;

pub use crawl::{prepare_ledger, Crawler, ListingOutcome, RunSummary, SkipReason};
pub use normalize::{normalize_ledger, NormalizeSummary};

use crate::browser::ChromiumBrowser;
use crate::config::ResolvedConfig;
use crate::errors::AppResult;
use crate::ledger::{Ledger, MemoryLedger, SheetsLedger};
use crate::utils::format_duration;
use std::time::Instant;
use tracing::info;

/// Crawls the portal with `config` and writes new opportunities to the ledger.
///
/// With `dry_run` the records go to an in-memory sheet and are logged instead.
///
/// # Errors
///
/// Only setup failures are returned; they happen before any query runs.
pub async fn run_crawl(config: &ResolvedConfig, dry_run: bool) -> AppResult<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    let memory = MemoryLedger::new();
    let sheets;
    let ledger: &dyn Ledger = if dry_run {
        info!("Dry run, records will not be written to the spreadsheet");
        &memory
    } else {
        sheets =
            SheetsLedger::connect(&config.credentials, &config.spreadsheet, &config.sheet).await?;
        &sheets
    };

    let dedup = prepare_ledger(ledger, config).await?;
    let mut browser = ChromiumBrowser::launch(config.headless, config.poll_interval()).await?;

    let summary = Crawler::new(config, ledger, dedup).run(&mut browser).await;
    browser.shutdown().await;

    if dry_run {
        for row in memory.rows() {
            info!(row = ?row, "Dry run record");
        }
    }
    report(&summary, started);
    Ok(summary)
}

/// Runs the normalization pass over the configured spreadsheet.
pub async fn run_normalize(config: &ResolvedConfig) -> AppResult<NormalizeSummary> {
    let ledger =
        SheetsLedger::connect(&config.credentials, &config.spreadsheet, &config.sheet).await?;
    normalize_ledger(&ledger, config).await
}

fn report(summary: &RunSummary, started: Instant) {
    info!(
        queries = summary.queries_planned,
        queries_failed = summary.queries_failed,
        listings_seen = summary.listings_seen,
        duplicates = summary.duplicates,
        excluded = summary.excluded,
        region_mismatches = summary.region_mismatches,
        listing_failures = summary.listing_failures,
        elapsed = %format_duration(started.elapsed()),
        "Search finished"
    );
    info!(new_listings = summary.persisted, "Total new listings added");
}
