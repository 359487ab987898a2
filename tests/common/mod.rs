//! Common test utilities for integration tests

use async_trait::async_trait;
use pcp_cli::browser::Browser;
use pcp_cli::config::ResolvedConfig;
use pcp_cli::errors::{AppError, AppResult};
use pcp_cli::ledger::{CellRange, InputMode, Ledger, MemoryLedger};
use pcp_cli::models::{SearchQuery, SyncMode};
use pcp_cli::search::build_search_url;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[allow(dead_code)]
pub const PORTAL: &str = "https://portal.test";

#[allow(dead_code)]
const BLANK_PAGE: &str = "<html><body></body></html>";

/// Browser double serving canned markup per URL.
///
/// A URL can carry several pages; clicking the next-page control advances through
/// them, like the item table of a detail page. With a click lag the new page only
/// shows up after that many further markup reads, like a slow re-render.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, Vec<String>>,
    current_url: String,
    cursor: Mutex<PageCursor>,
    click_lag: usize,
    clicks: usize,
    visits: Vec<String>,
}

#[derive(Debug, Default)]
struct PageCursor {
    page: usize,
    pending: Option<usize>,
    reads_left: usize,
}

#[allow(dead_code)]
impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), vec![markup.into()]);
        self
    }

    pub fn with_pages(mut self, url: impl Into<String>, pages: Vec<String>) -> Self {
        self.pages.insert(url.into(), pages);
        self
    }

    pub fn with_results(self, keyword: &str, region: &str, markup: impl Into<String>) -> Self {
        let url = search_url(keyword, region);
        self.with_page(url, markup)
    }

    /// Delays every click until `reads` more markup reads have happened.
    pub fn with_click_lag(mut self, reads: usize) -> Self {
        self.click_lag = reads;
        self
    }

    /// Every URL opened, in order.
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    pub fn visit_count(&self, url: &str) -> usize {
        self.visits.iter().filter(|v| v.as_str() == url).count()
    }

    pub fn click_count(&self) -> usize {
        self.clicks
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open(&mut self, url: &str) -> AppResult<()> {
        self.visits.push(url.to_string());
        self.current_url = url.to_string();
        *self.cursor.lock().unwrap() = PageCursor::default();
        Ok(())
    }

    async fn page_markup(&self) -> AppResult<String> {
        let page = {
            let mut cursor = self.cursor.lock().unwrap();
            if let Some(next) = cursor.pending {
                if cursor.reads_left == 0 {
                    cursor.page = next;
                    cursor.pending = None;
                } else {
                    cursor.reads_left -= 1;
                }
            }
            cursor.page
        };
        Ok(self
            .pages
            .get(&self.current_url)
            .and_then(|pages| pages.get(page))
            .cloned()
            .unwrap_or_else(|| BLANK_PAGE.to_string()))
    }

    async fn click(&mut self, selector: &str) -> AppResult<()> {
        let count = self.pages.get(&self.current_url).map_or(0, Vec::len);
        let mut cursor = self.cursor.lock().unwrap();
        let target = cursor.pending.unwrap_or(cursor.page) + 1;
        if target >= count {
            return Err(AppError::BrowserError(format!(
                "Nothing to click for '{selector}' on {}",
                self.current_url
            )));
        }
        cursor.pending = Some(target);
        cursor.reads_left = self.click_lag;
        drop(cursor);
        self.clicks += 1;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }
}

/// Ledger whose first `failures` appends fail.
#[allow(dead_code)]
pub struct FlakyLedger {
    pub inner: MemoryLedger,
    failures: Mutex<usize>,
}

#[allow(dead_code)]
impl FlakyLedger {
    pub fn new(inner: MemoryLedger, failures: usize) -> Self {
        Self {
            inner,
            failures: Mutex::new(failures),
        }
    }
}

#[async_trait]
impl Ledger for FlakyLedger {
    async fn clear_range(&self, range: &CellRange) -> AppResult<()> {
        self.inner.clear_range(range).await
    }

    async fn read_column(&self, column: u32, from_row: u32) -> AppResult<Vec<String>> {
        self.inner.read_column(column, from_row).await
    }

    async fn read_all(&self) -> AppResult<Vec<Vec<String>>> {
        self.inner.read_all().await
    }

    async fn append_row(&self, fields: &[String], mode: InputMode) -> AppResult<()> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(AppError::PersistenceError("quota exceeded".into()));
            }
        }
        self.inner.append_row(fields, mode).await
    }

    async fn update_range(&self, values: &[Vec<String>], range: &CellRange) -> AppResult<()> {
        self.inner.update_range(values, range).await
    }
}

/// Config pointed at the fake portal, with zero waits.
#[allow(dead_code)]
pub fn test_config(keywords: &[&str], regions: &[&str]) -> ResolvedConfig {
    ResolvedConfig {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        regions: regions.iter().map(|r| r.to_string()).collect(),
        portal_url: PORTAL.to_string(),
        sync_mode: SyncMode::Rebuild,
        results_timeout_secs: 0,
        detail_timeout_secs: 0,
        cookie_timeout_secs: 0,
        poll_interval_ms: 1,
        results_settle_ms: 0,
        page_settle_ms: 0,
        detail_delay_ms: 0,
        persist_delay_ms: 0,
        ..ResolvedConfig::default()
    }
}

#[allow(dead_code)]
pub fn search_url(keyword: &str, region: &str) -> String {
    let query = SearchQuery {
        keyword: keyword.to_string(),
        region: region.to_string(),
    };
    build_search_url(PORTAL, &query).unwrap().to_string()
}

#[allow(dead_code)]
pub fn detail_url(path: &str) -> String {
    format!("{PORTAL}{path}")
}

#[allow(dead_code)]
pub fn header_row() -> Vec<String> {
    [
        "Status",
        "Data de Publicação",
        "Limite p/ Propostas",
        "UF",
        "Órgão Licitante",
        "Número",
        "Objeto da Licitação",
        "Link",
        "Data Encontrada",
        "Valor Estimado",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

/// One result card as rendered on the search page.
#[allow(dead_code)]
pub fn result_card(path: &str, number: &str, object: &str, location: &str) -> String {
    format!(
        r#"<div class="item">
             <h2><span>{number}</span> <a href="{path}">{object}</a></h2>
             <span><i class="cp-calendario"></i> 01/02/2024</span>
             <span><i class="cp-pin-mapa"></i> {location}</span>
             <a class="btn btn-default" href="{path}">Ver processo</a>
           </div>"#
    )
}

#[allow(dead_code)]
pub fn results_page(cards: &[String]) -> String {
    format!("<html><body><div class=\"lista\">{}</div></body></html>", cards.concat())
}

#[allow(dead_code)]
pub const EMPTY_RESULTS_PAGE: &str =
    r#"<html><body><div class="empty-list-container">Nenhum processo encontrado</div></body></html>"#;

/// Detail page with one item page; `items` are (quantity, unit value) pairs.
#[allow(dead_code)]
pub fn detail_page(items: &[(&str, &str)], has_next: bool) -> String {
    let rows: String = items
        .iter()
        .map(|(quantity, value)| {
            format!(
                r#"<div class="item-processo"><span class="quantidade">{quantity}</span><span class="valor-referencia">{value}</span></div>"#
            )
        })
        .collect();
    let next_class = if has_next { "next" } else { "next disabled" };
    format!(
        r##"<html><body>
             <div class="datas-processo">Publicação: 01/02/2024<br>Limite p/ Recebimento das Propostas: 20/02/2024 09:00<br/>Abertura: 21/02/2024</div>
             <div id="itens">{rows}<div class="pagination"><a class="{next_class}" href="#">Próxima</a></div></div>
           </body></html>"##
    )
}

/// Item page that only carries the empty-list marker.
#[allow(dead_code)]
pub const EMPTY_ITEMS_PAGE: &str = r#"<html><body>
     <div id="itens"><div class="empty-list-container">Nenhum item</div></div>
   </body></html>"#;
