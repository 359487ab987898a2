use super::Browser;
use crate::constants::USER_AGENT;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A single Chromium tab driven over the DevTools protocol.
///
/// The session is stateful: every [`Browser::open`] replaces the page in the same
/// tab, so callers must navigate sequentially. Call [`ChromiumBrowser::shutdown`]
/// when done; the process is not closed on drop.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    poll_interval: Duration,
}

impl ChromiumBrowser {
    /// Launches Chromium and opens a blank tab.
    ///
    /// # Errors
    ///
    /// Returns `SetupFailure` if the browser cannot be configured, launched, or
    /// refuses to open a tab.
    pub async fn launch(headless: bool, poll_interval: Duration) -> AppResult<Self> {
        info!(headless = headless, "Launching Chromium session");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--log-level=3")
            .arg(format!("--user-agent={USER_AGENT}"));
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| AppError::SetupFailure(format!("Invalid browser configuration: {e}")))?;

        let (browser, mut events) = CdpBrowser::launch(config)
            .await
            .map_err(|e| AppError::SetupFailure(format!("Failed to launch Chromium: {e}")))?;

        // The protocol handler must be polled for the session to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser event loop stopped");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(AppError::SetupFailure(format!(
                    "Failed to open browser tab: {e}"
                )));
            }
        };

        info!("Browser session ready");
        Ok(Self {
            browser,
            page,
            handler,
            poll_interval,
        })
    }

    /// Closes the browser process and stops the protocol handler.
    ///
    /// Failures are logged; there is nothing left to recover at this point.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Failed to close browser cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Failed to wait for browser process");
        }
        self.handler.abort();
        info!("Browser session released");
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open(&mut self, url: &str) -> AppResult<()> {
        debug!(url = url, "Navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn page_markup(&self) -> AppResult<String> {
        Ok(self.page.content().await?)
    }

    async fn click(&mut self, selector: &str) -> AppResult<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
