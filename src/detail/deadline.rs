use crate::browser::dom::{cached_selector, fragment_text};
use crate::browser::Browser;
use crate::constants::{DATE_SUMMARY_SELECTOR, DEADLINE_LABEL, LINE_BREAK_PATTERN, NOT_FOUND};
use crate::errors::AppResult;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

static DATE_SUMMARY: OnceLock<Selector> = OnceLock::new();
static LINE_BREAK: OnceLock<Regex> = OnceLock::new();

/// Reads the proposal deadline from the current detail page.
///
/// Falls back to `"Não encontrado"` when the date summary never shows up or has
/// no deadline line.
pub async fn extract_deadline<B>(browser: &B, timeout: Duration) -> AppResult<String>
where
    B: Browser + ?Sized,
{
    if let Err(e) = browser.wait_for_any(&[DATE_SUMMARY_SELECTOR], timeout).await {
        if !e.is_timeout() {
            return Err(e);
        }
        warn!(error = %e, "Date summary not found, recording deadline as missing");
        return Ok(NOT_FOUND.to_string());
    }

    let markup = browser.page_markup().await?;
    Ok(parse_deadline(&markup).unwrap_or_else(|| NOT_FOUND.to_string()))
}

/// Finds the deadline line inside the date summary markup.
///
/// The summary is split on `<br>` tags; the line carrying the deadline label is
/// stripped of markup and of the label itself.
pub fn parse_deadline(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let summary = document
        .select(cached_selector(&DATE_SUMMARY, DATE_SUMMARY_SELECTOR))
        .next()?;
    let inner = summary.inner_html();

    let line_break = LINE_BREAK.get_or_init(|| {
        Regex::new(LINE_BREAK_PATTERN).expect("LINE_BREAK_PATTERN is a valid regex pattern")
    });

    line_break
        .split(&inner)
        .map(fragment_text)
        .find(|line| line.contains(DEADLINE_LABEL))
        .map(|line| line.replacen(DEADLINE_LABEL, "", 1).trim().to_string())
        .filter(|deadline| !deadline.is_empty())
}
