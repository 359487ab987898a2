//! Read-only helpers over parsed page markup.
//!
//! Everything here is synchronous and returns owned data, so parsed documents never
//! live across an `.await`.

use crate::errors::{AppError, AppResult};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Parses a CSS selector, reporting failures as `SelectorError`.
pub fn parse_selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::SelectorError(format!("{css}: {e:?}")))
}

/// Returns a selector compiled once from a constant.
///
/// Only meant for the selectors in [`crate::constants`], which are known to be valid.
pub(crate) fn cached_selector(
    cell: &'static OnceLock<Selector>,
    css: &'static str,
) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("constant selector is a valid CSS selector"))
}

/// Index of the first selector with at least one match in the markup.
pub fn first_match(markup: &str, selectors: &[Selector]) -> Option<usize> {
    let document = Html::parse_document(markup);
    selectors
        .iter()
        .position(|selector| document.select(selector).next().is_some())
}

/// Text content of an element with whitespace runs collapsed to single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant matching `selector`, if any.
pub fn child_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(element_text)
}

/// Text content of an HTML fragment, entities decoded and whitespace collapsed.
pub fn fragment_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    collapse_whitespace(&parsed.root_element().text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
