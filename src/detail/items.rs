use crate::browser::dom::{cached_selector, child_text};
use crate::browser::Browser;
use crate::config::Timeouts;
use crate::constants::*;
use crate::errors::AppResult;
use crate::utils::parse_localized_number;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

static ITEMS_SECTION: OnceLock<Selector> = OnceLock::new();
static ITEM_ROW: OnceLock<Selector> = OnceLock::new();
static ITEM_QUANTITY: OnceLock<Selector> = OnceLock::new();
static ITEM_UNIT_VALUE: OnceLock<Selector> = OnceLock::new();
static NEXT_PAGE: OnceLock<Selector> = OnceLock::new();

/// Running total of an item table walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTotals {
    pub total: f64,
    pub rows: usize,
    pub pages: u32,
    /// The walk stopped at the page ceiling while a next page was still offered.
    pub hit_page_limit: bool,
}

/// Walks the paginated item table of the current detail page, summing
/// quantity x unit reference value over every row.
///
/// A missing items section yields a zero total. The walk ends on the empty-list
/// marker, when no enabled "next" control is left, or after `max_pages` pages.
///
/// After each click the walk waits for the items block to differ from the page
/// just summed, so a slow re-render never counts the same rows twice. If the block
/// does not change within the detail timeout the partial total is kept.
///
/// # Errors
///
/// Timeouts are absorbed; other browser failures (e.g. a failed click) are
/// returned.
pub async fn aggregate_items<B>(
    browser: &mut B,
    timeouts: &Timeouts,
    max_pages: u32,
) -> AppResult<ItemTotals>
where
    B: Browser + ?Sized,
{
    let mut totals = ItemTotals::default();

    if let Err(e) = browser
        .wait_for_any(&[ITEMS_SECTION_SELECTOR], timeouts.detail)
        .await
    {
        if !e.is_timeout() {
            return Err(e);
        }
        warn!(error = %e, "Items section not found, estimated value defaults to zero");
        return Ok(totals);
    }

    while totals.pages < max_pages {
        match browser
            .wait_for_any(&[ITEM_ROW_SELECTOR, ITEMS_EMPTY_SELECTOR], timeouts.detail)
            .await
        {
            Ok(1) => {
                debug!(page = totals.pages + 1, "Item list is empty");
                break;
            }
            Ok(_) => {}
            Err(e) if e.is_timeout() => {
                warn!(error = %e, page = totals.pages + 1, "No item rows rendered, keeping partial total");
                break;
            }
            Err(e) => return Err(e),
        }

        let markup = browser.page_markup().await?;
        let (page_total, rows) = sum_item_rows(&markup);
        totals.total += page_total;
        totals.rows += rows;
        totals.pages += 1;
        debug!(
            page = totals.pages,
            rows = rows,
            page_total = page_total,
            "Item page aggregated"
        );

        if !has_next_page(&markup) {
            break;
        }
        if totals.pages >= max_pages {
            totals.hit_page_limit = true;
            warn!(
                max_pages = max_pages,
                "Item page limit reached, keeping partial total"
            );
            break;
        }

        let previous = items_fingerprint(&markup);
        browser.click(NEXT_PAGE_SELECTOR).await?;
        tokio::time::sleep(timeouts.page_settle).await;

        if !wait_for_items_change(&*browser, previous.as_deref(), timeouts.detail).await? {
            warn!(
                page = totals.pages,
                "Item list did not change after paging, keeping partial total"
            );
            break;
        }
    }

    Ok(totals)
}

/// Inner markup of the items block, used to tell one item page from the next.
pub fn items_fingerprint(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    document
        .select(cached_selector(&ITEMS_SECTION, ITEMS_SECTION_SELECTOR))
        .next()
        .map(|section| section.inner_html())
}

/// Polls until the items block differs from `previous`. Returns `false` on timeout.
async fn wait_for_items_change<B>(
    browser: &B,
    previous: Option<&str>,
    timeout: Duration,
) -> AppResult<bool>
where
    B: Browser + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        let markup = browser.page_markup().await?;
        if items_fingerprint(&markup).as_deref() != previous {
            return Ok(true);
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(browser.poll_interval().min(deadline - now)).await;
    }
}

/// Sums quantity x unit value over the item rows of one page.
///
/// Returns the page total and the number of rows. Missing or unreadable fields
/// count as zero.
pub fn sum_item_rows(markup: &str) -> (f64, usize) {
    let document = Html::parse_document(markup);
    let quantity_sel = cached_selector(&ITEM_QUANTITY, ITEM_QUANTITY_SELECTOR);
    let unit_sel = cached_selector(&ITEM_UNIT_VALUE, ITEM_UNIT_VALUE_SELECTOR);

    document
        .select(cached_selector(&ITEM_ROW, ITEM_ROW_SELECTOR))
        .map(|row| {
            let quantity = child_text(row, quantity_sel)
                .map(|t| parse_localized_number(&t))
                .unwrap_or(0.0);
            let unit_value = child_text(row, unit_sel)
                .map(|t| parse_localized_number(&t))
                .unwrap_or(0.0);
            quantity * unit_value
        })
        .fold((0.0, 0), |(sum, count), line| (sum + line, count + 1))
}

/// Whether the page offers an enabled "next page" control.
pub fn has_next_page(markup: &str) -> bool {
    let document = Html::parse_document(markup);
    document
        .select(cached_selector(&NEXT_PAGE, NEXT_PAGE_SELECTOR))
        .next()
        .is_some()
}
