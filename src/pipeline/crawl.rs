use crate::browser::Browser;
use crate::classifier::{classify, Classification};
use crate::config::{ResolvedConfig, Timeouts};
use crate::constants::{COOKIE_BUTTON_SELECTOR, FOUND_DATE_FORMAT, LINK_COLUMN, PROCESSES_PATH};
use crate::dedup::Deduplicator;
use crate::detail::DetailExtractor;
use crate::errors::{AppError, AppResult};
use crate::ledger::{record_row, row_width, CellRange, InputMode, Ledger};
use crate::models::{ListingStub, Record, SearchQuery, SyncMode};
use crate::normalizer::{canonical_object, clean_organization};
use crate::planner::plan_queries;
use crate::search::scrape_query;
use crate::ui;
use crate::utils::format_currency;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};
use url::Url;

/// Why a listing was not persisted. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Already persisted earlier in the run (or found in the ledger).
    Duplicate,
    /// Object text contains this exclusion entry.
    Excluded(String),
    /// The listing reports a different region than the query asked for.
    RegionMismatch { expected: String, found: String },
}

/// What happened to one listing stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    Persisted(Record),
    Skipped(SkipReason),
}

/// Counters reported at the end of every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub queries_planned: usize,
    pub queries_completed: usize,
    pub queries_failed: usize,
    pub listings_seen: usize,
    pub persisted: usize,
    pub duplicates: usize,
    pub excluded: usize,
    pub region_mismatches: usize,
    pub listing_failures: usize,
}

impl RunSummary {
    fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Duplicate => self.duplicates += 1,
            SkipReason::Excluded(_) => self.excluded += 1,
            SkipReason::RegionMismatch { .. } => self.region_mismatches += 1,
        }
    }
}

/// Prepares the ledger for a run and returns the dedup set seeded from it.
///
/// In [`SyncMode::Rebuild`] every data row below the header is cleared first.
///
/// # Errors
///
/// A failed clear is fatal and returned. A failed read of the link column only
/// leaves the dedup set empty.
pub async fn prepare_ledger(ledger: &dyn Ledger, config: &ResolvedConfig) -> AppResult<Deduplicator> {
    if config.sync_mode == SyncMode::Rebuild {
        let range = CellRange::below_header(
            config.header_row,
            row_width(config.include_estimated_value),
        );
        ledger.clear_range(&range).await.map_err(|e| {
            AppError::PersistenceError(format!("Failed to clear {}: {e}", range.a1()))
        })?;
        info!(
            header_row = config.header_row,
            range = %range.a1(),
            "Old rows cleared, ledger ready for fresh data"
        );
    }

    match ledger.read_column(LINK_COLUMN, config.header_row + 1).await {
        Ok(links) => {
            let dedup = Deduplicator::with_seed(links);
            info!(
                stored_links = dedup.len(),
                sync_mode = config.sync_mode.display_name(),
                "Existing listings loaded"
            );
            Ok(dedup)
        }
        Err(e) => {
            warn!(error = %e, "Could not read stored links, starting with an empty set");
            Ok(Deduplicator::new())
        }
    }
}

/// Drives the query plan through the browser and into the ledger.
///
/// One instance serves one run: the dedup set and counters live here and are only
/// touched from the single sequential crawl loop.
pub struct Crawler<'a> {
    config: &'a ResolvedConfig,
    ledger: &'a dyn Ledger,
    extractor: DetailExtractor,
    timeouts: Timeouts,
    dedup: Deduplicator,
    found_date: String,
    summary: RunSummary,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &'a ResolvedConfig, ledger: &'a dyn Ledger, dedup: Deduplicator) -> Self {
        let timeouts = config.timeouts();
        Self {
            config,
            ledger,
            extractor: DetailExtractor::new(timeouts, config.max_item_pages),
            timeouts,
            dedup,
            found_date: chrono::Local::now().format(FOUND_DATE_FORMAT).to_string(),
            summary: RunSummary::default(),
        }
    }

    /// Overrides the discovery date stamped on new records.
    pub fn with_found_date(mut self, found_date: impl Into<String>) -> Self {
        self.found_date = found_date.into();
        self
    }

    /// Runs every planned query. Failures are logged and skipped, so this always
    /// returns the counters of the run.
    pub async fn run<B>(mut self, browser: &mut B) -> RunSummary
    where
        B: Browser + ?Sized,
    {
        let plan = plan_queries(&self.config.keywords, &self.config.regions);
        self.summary.queries_planned = plan.len();
        info!(
            queries = plan.len(),
            keywords = self.config.keywords.len(),
            regions = self.config.regions.len(),
            "Starting search on the procurement portal"
        );

        self.accept_cookies(&mut *browser).await;

        let pb = ui::create_progress_bar(plan.len() as u64).unwrap_or_else(|e| {
            warn!(error = %e, "Progress bar unavailable");
            ProgressBar::hidden()
        });

        for query in &plan {
            pb.set_message(format!("{} / {}", query.keyword, query.region));
            info!(keyword = %query.keyword, region = %query.region, "Searching");
            match self.process_query(&mut *browser, query).await {
                Ok(()) => self.summary.queries_completed += 1,
                Err(e) => {
                    self.summary.queries_failed += 1;
                    warn!(
                        keyword = %query.keyword,
                        region = %query.region,
                        error = %e,
                        "Query skipped"
                    );
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("search finished");

        self.summary
    }

    async fn accept_cookies<B>(&self, browser: &mut B)
    where
        B: Browser + ?Sized,
    {
        let landing = match Url::parse(&self.config.portal_url).and_then(|u| u.join(PROCESSES_PATH)) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid portal URL, skipping cookie banner");
                return;
            }
        };
        if let Err(e) = browser.open(landing.as_str()).await {
            warn!(error = %e, "Could not open the portal landing page");
            return;
        }

        match browser
            .wait_for_any(&[COOKIE_BUTTON_SELECTOR], self.timeouts.cookie)
            .await
        {
            Ok(_) => match browser.click(COOKIE_BUTTON_SELECTOR).await {
                Ok(()) => info!("Cookies accepted"),
                Err(e) => warn!(error = %e, "Could not click the cookie button"),
            },
            Err(e) if e.is_timeout() => info!("Cookie banner not shown or already accepted"),
            Err(e) => warn!(error = %e, "Cookie banner check failed"),
        }
    }

    async fn process_query<B>(&mut self, browser: &mut B, query: &SearchQuery) -> AppResult<()>
    where
        B: Browser + ?Sized,
    {
        let stubs = scrape_query(&mut *browser, &self.config.portal_url, query, &self.timeouts).await?;

        for stub in &stubs {
            self.summary.listings_seen += 1;
            match self.process_listing(&mut *browser, query, stub).await {
                Ok(ListingOutcome::Persisted(record)) => {
                    self.summary.persisted += 1;
                    info!(
                        organization = %record.organization,
                        region = %record.region,
                        listing_number = %record.listing_number,
                        estimated_value = %record.estimated_value_formatted,
                        "New opportunity recorded"
                    );
                }
                Ok(ListingOutcome::Skipped(reason)) => {
                    debug!(link = %stub.link, reason = ?reason, "Listing skipped");
                    self.summary.record_skip(&reason);
                }
                Err(e) if e.is_recoverable() => {
                    self.summary.listing_failures += 1;
                    warn!(link = %stub.link, error = %e, "Listing page incomplete, skipping");
                }
                Err(e) => {
                    self.summary.listing_failures += 1;
                    warn!(link = %stub.link, error = %e, "Listing failed, skipping");
                }
            }
        }

        Ok(())
    }

    /// Runs one stub through dedup, classification, region check, detail
    /// extraction, normalization and persistence, in that order.
    pub async fn process_listing<B>(
        &mut self,
        browser: &mut B,
        query: &SearchQuery,
        stub: &ListingStub,
    ) -> AppResult<ListingOutcome>
    where
        B: Browser + ?Sized,
    {
        if !self.dedup.is_new(&stub.link) {
            return Ok(ListingOutcome::Skipped(SkipReason::Duplicate));
        }
        if let Classification::Excluded(entry) = classify(&stub.object_raw, &self.config.filter()) {
            return Ok(ListingOutcome::Skipped(SkipReason::Excluded(entry)));
        }
        if stub.region_raw != query.region {
            return Ok(ListingOutcome::Skipped(SkipReason::RegionMismatch {
                expected: query.region.clone(),
                found: stub.region_raw.clone(),
            }));
        }

        tokio::time::sleep(self.timeouts.detail_delay).await;
        debug!(link = %stub.link, "Collecting details");
        let detail = self.extractor.extract(browser, &stub.link).await?;

        let normalize = self.config.normalize();
        let record = Record::assemble(
            stub,
            &detail,
            clean_organization(&stub.organization_raw, normalize.org_prefixes),
            canonical_object(&stub.object_raw, normalize.object_phrases),
            self.found_date.clone(),
            format_currency(detail.estimated_value),
        );

        if !self.dedup.is_new(&record.link) {
            return Ok(ListingOutcome::Skipped(SkipReason::Duplicate));
        }
        self.persist(&record).await?;
        self.dedup.mark_seen(&record.link);

        Ok(ListingOutcome::Persisted(record))
    }

    async fn persist(&self, record: &Record) -> AppResult<()> {
        let row = record_row(record, self.config.include_estimated_value);
        self.ledger
            .append_row(&row, InputMode::UserEntered)
            .await
            .map_err(|e| AppError::PersistenceError(format!("Append failed for {}: {e}", record.link)))?;
        tokio::time::sleep(self.timeouts.persist_delay).await;
        Ok(())
    }
}
