//! Search result pages: query URL construction and listing stub extraction.

use crate::browser::dom::{cached_selector, child_text, element_text};
use crate::browser::Browser;
use crate::config::Timeouts;
use crate::constants::*;
use crate::errors::AppResult;
use crate::models::{ListingStub, SearchQuery};
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

static RESULT_ITEM: OnceLock<Selector> = OnceLock::new();
static EMPTY_RESULTS: OnceLock<Selector> = OnceLock::new();
static DETAIL_LINK: OnceLock<Selector> = OnceLock::new();
static TITLE: OnceLock<Selector> = OnceLock::new();
static TITLE_OBJECT: OnceLock<Selector> = OnceLock::new();
static TITLE_NUMBER: OnceLock<Selector> = OnceLock::new();
static SPAN: OnceLock<Selector> = OnceLock::new();
static CALENDAR_ICON: OnceLock<Selector> = OnceLock::new();
static LOCATION_ICON: OnceLock<Selector> = OnceLock::new();

/// Builds the process list URL filtered by keyword, region and open status.
///
/// # Errors
///
/// Returns `UrlError` if `portal_url` is not a valid base URL.
pub fn build_search_url(portal_url: &str, query: &SearchQuery) -> AppResult<Url> {
    let mut url = Url::parse(portal_url)?.join(PROCESSES_PATH)?;
    url.query_pairs_mut()
        .append_pair(QUERY_KEYWORD_PARAM, &query.keyword)
        .append_pair(QUERY_REGION_PARAM, &query.region)
        .append_pair(QUERY_STATUS_PARAM, OPEN_STATUS_CODE);
    Ok(url)
}

/// Navigates to the query's result page and parses its listing stubs.
///
/// Returns an empty list when the portal shows its empty-results marker.
///
/// # Errors
///
/// Returns `NavigationTimeout` when neither results nor the empty marker appear in
/// time (the caller skips the query), or any browser/URL error.
pub async fn scrape_query<B>(
    browser: &mut B,
    portal_url: &str,
    query: &SearchQuery,
    timeouts: &Timeouts,
) -> AppResult<Vec<ListingStub>>
where
    B: Browser + ?Sized,
{
    let url = build_search_url(portal_url, query)?;
    browser.open(url.as_str()).await?;

    let signal = browser
        .wait_for_any(&[RESULT_ITEM_SELECTOR, EMPTY_RESULTS_SELECTOR], timeouts.results)
        .await?;
    if signal == 1 {
        info!(
            keyword = %query.keyword,
            region = %query.region,
            "No results for this combination"
        );
        return Ok(Vec::new());
    }

    // Results render progressively; give the list a moment to settle.
    tokio::time::sleep(timeouts.results_settle).await;

    let markup = browser.page_markup().await?;
    let base_url = Url::parse(portal_url)?;
    let stubs = parse_listing_stubs(&markup, &base_url);
    info!(
        keyword = %query.keyword,
        region = %query.region,
        listings = stubs.len(),
        "Results page parsed"
    );
    Ok(stubs)
}

/// Parses every result block of a search page into a [`ListingStub`].
///
/// Blocks without a detail link or a title are skipped. A page carrying the
/// empty-results marker yields no stubs.
pub fn parse_listing_stubs(markup: &str, base_url: &Url) -> Vec<ListingStub> {
    let document = Html::parse_document(markup);

    if document
        .select(cached_selector(&EMPTY_RESULTS, EMPTY_RESULTS_SELECTOR))
        .next()
        .is_some()
    {
        return Vec::new();
    }

    let detail_link = cached_selector(&DETAIL_LINK, DETAIL_LINK_SELECTOR);
    let title_sel = cached_selector(&TITLE, TITLE_SELECTOR);
    let title_object = cached_selector(&TITLE_OBJECT, TITLE_OBJECT_SELECTOR);
    let title_number = cached_selector(&TITLE_NUMBER, TITLE_NUMBER_SELECTOR);
    let span_sel = cached_selector(&SPAN, SPAN_SELECTOR);
    let calendar_icon = cached_selector(&CALENDAR_ICON, CALENDAR_ICON_SELECTOR);
    let location_icon = cached_selector(&LOCATION_ICON, LOCATION_ICON_SELECTOR);

    let mut stubs = Vec::new();
    for item in document.select(cached_selector(&RESULT_ITEM, RESULT_ITEM_SELECTOR)) {
        let href = item
            .select(detail_link)
            .next()
            .and_then(|a| a.value().attr("href"));
        let title = item.select(title_sel).next();
        let (href, title) = match (href, title) {
            (Some(href), Some(title)) => (href, title),
            _ => {
                debug!("Result block without detail link or title, skipping");
                continue;
            }
        };

        let link = match base_url.join(href) {
            Ok(link) => link.to_string(),
            Err(e) => {
                debug!(href = href, error = %e, "Unresolvable detail link, skipping");
                continue;
            }
        };

        let mut published_date = NOT_AVAILABLE.to_string();
        let mut organization = NOT_AVAILABLE.to_string();
        let mut region = NOT_AVAILABLE.to_string();
        for span in item.select(span_sel) {
            if span.select(calendar_icon).next().is_some() {
                published_date = element_text(span);
            } else if span.select(location_icon).next().is_some() {
                let (org, uf) = split_location(&element_text(span));
                organization = org;
                if let Some(uf) = uf {
                    region = uf;
                }
            }
        }

        stubs.push(ListingStub {
            link,
            title: element_text(title),
            published_date_raw: published_date,
            organization_raw: organization,
            region_raw: region,
            object_raw: child_text(title, title_object)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            listing_number_raw: child_text(title, title_number)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        });
    }

    stubs
}

/// Splits "Organization - UF" on the last separator.
fn split_location(text: &str) -> (String, Option<String>) {
    match text.rsplit_once(LOCATION_SEPARATOR) {
        Some((org, uf)) => (org.trim().to_string(), Some(uf.trim().to_string())),
        None => (text.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="item">
            <h2><span>Pregão 12/2024</span> <a href="/processos/sp/1">Serviço de vigilância armada</a></h2>
            <span><i class="cp-calendario"></i> 01/02/2024</span>
            <span><i class="cp-pin-mapa"></i> Prefeitura Municipal de Santos - SP</span>
            <a class="btn btn-default" href="/processos/sp/1">Ver processo</a>
          </div>
          <div class="item">
            <h2><a href="/processos/sp/2">Sem link de detalhe</a></h2>
          </div>
          <div class="item">
            <h2>Sem objeto</h2>
            <span><i class="cp-pin-mapa"></i> Consórcio Vale - Norte - MG</span>
            <a class="btn-default" href="/processos/mg/3">Ver</a>
          </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.portaldecompraspublicas.com.br").unwrap()
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let query = SearchQuery {
            keyword: "segurança eletrônica".to_string(),
            region: "SP".to_string(),
        };
        let url = build_search_url("https://www.portaldecompraspublicas.com.br", &query).unwrap();

        assert_eq!(url.path(), "/processos");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("objeto".to_string(), "segurança eletrônica".to_string()),
                ("uf_ge".to_string(), "SP".to_string()),
                ("codigoStatus".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_listing_stubs_extracts_fields() {
        let stubs = parse_listing_stubs(RESULTS_PAGE, &base());
        assert_eq!(stubs.len(), 2);

        let first = &stubs[0];
        assert_eq!(
            first.link,
            "https://www.portaldecompraspublicas.com.br/processos/sp/1"
        );
        assert_eq!(first.object_raw, "Serviço de vigilância armada");
        assert_eq!(first.listing_number_raw, "Pregão 12/2024");
        assert_eq!(first.published_date_raw, "01/02/2024");
        assert_eq!(first.organization_raw, "Prefeitura Municipal de Santos");
        assert_eq!(first.region_raw, "SP");
    }

    #[test]
    fn test_parse_listing_stubs_defaults_missing_parts() {
        let stubs = parse_listing_stubs(RESULTS_PAGE, &base());
        let third = &stubs[1];

        assert_eq!(third.object_raw, "N/A");
        assert_eq!(third.listing_number_raw, "N/A");
        assert_eq!(third.published_date_raw, "N/A");
        // Only the last separator splits organization from region.
        assert_eq!(third.organization_raw, "Consórcio Vale - Norte");
        assert_eq!(third.region_raw, "MG");
    }

    #[test]
    fn test_parse_listing_stubs_empty_marker() {
        let html = r#"<div class="empty-list-container">Nenhum processo</div>"#;
        assert!(parse_listing_stubs(html, &base()).is_empty());
    }

    #[test]
    fn test_split_location_without_separator() {
        assert_eq!(
            split_location("Prefeitura de Itu"),
            ("Prefeitura de Itu".to_string(), None)
        );
    }
}
