//! Detail page extraction: proposal deadline and estimated contract value.
//!
//! The two phases recover independently. A missing date summary records
//! `"Não encontrado"`, a missing item table records a zero value, and neither
//! aborts the listing.

mod deadline;
mod items;

pub use deadline::{extract_deadline, parse_deadline};
pub use items::{aggregate_items, has_next_page, items_fingerprint, sum_item_rows, ItemTotals};

use crate::browser::Browser;
use crate::config::Timeouts;
use crate::errors::AppResult;
use crate::models::ListingDetail;
use crate::utils::format_currency;
use tracing::info;

/// Visits listing pages and extracts their [`ListingDetail`].
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    timeouts: Timeouts,
    max_item_pages: u32,
}

impl DetailExtractor {
    pub fn new(timeouts: Timeouts, max_item_pages: u32) -> Self {
        Self {
            timeouts,
            max_item_pages: max_item_pages.max(1),
        }
    }

    /// Opens the listing and runs both extraction phases on it.
    ///
    /// # Errors
    ///
    /// Returns navigation or browser errors that are not plain timeouts; the caller
    /// treats them as a skip for this listing.
    pub async fn extract<B>(&self, browser: &mut B, link: &str) -> AppResult<ListingDetail>
    where
        B: Browser + ?Sized,
    {
        browser.open(link).await?;

        let proposal_deadline_raw = extract_deadline(&*browser, self.timeouts.detail).await?;
        let totals = aggregate_items(browser, &self.timeouts, self.max_item_pages).await?;

        info!(
            link = link,
            deadline = %proposal_deadline_raw,
            item_rows = totals.rows,
            item_pages = totals.pages,
            hit_page_limit = totals.hit_page_limit,
            estimated_value = %format_currency(totals.total),
            "Detail extracted"
        );

        Ok(ListingDetail {
            proposal_deadline_raw,
            estimated_value: totals.total.max(0.0),
        })
    }
}
