//! Browser capability used by the crawl.
//!
//! The pipeline only needs to navigate, read the current markup, click an element
//! and wait for page conditions. [`Browser::wait_for_any`] is built on top of the
//! first three, so any implementation (a Chromium session, or canned markup in tests)
//! gets the same bounded polling behavior.

mod chromium;
pub mod dom;

pub use chromium::ChromiumBrowser;

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigates to `url`, replacing the current page.
    async fn open(&mut self, url: &str) -> AppResult<()>;

    /// Returns the current page markup.
    async fn page_markup(&self) -> AppResult<String>;

    /// Clicks the first element matching the CSS selector.
    async fn click(&mut self, selector: &str) -> AppResult<()>;

    /// Interval between condition checks in [`Browser::wait_for_any`].
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Waits until any of the CSS selectors matches the current page.
    ///
    /// Returns the index of the first matching selector (in slice order). The page
    /// is checked at least once even with a zero timeout.
    ///
    /// # Errors
    ///
    /// Returns `NavigationTimeout` when nothing matched before `timeout`,
    /// `SelectorError` for an invalid selector, or whatever reading the markup fails
    /// with.
    async fn wait_for_any(&self, selectors: &[&str], timeout: Duration) -> AppResult<usize> {
        let compiled = selectors
            .iter()
            .map(|css| dom::parse_selector(css))
            .collect::<AppResult<Vec<_>>>()?;

        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            let markup = self.page_markup().await?;
            if let Some(index) = dom::first_match(&markup, &compiled) {
                debug!(
                    matched = selectors[index],
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Page condition met"
                );
                return Ok(index);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AppError::NavigationTimeout {
                    waited_ms: started.elapsed().as_millis(),
                    selectors: selectors.join(" | "),
                });
            }
            tokio::time::sleep(self.poll_interval().min(deadline - now)).await;
        }
    }
}
