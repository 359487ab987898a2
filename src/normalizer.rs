//! Free-text normalization for listing objects and organization names.
//!
//! Both mappings are pure and idempotent: feeding their output back in returns the
//! same value, which keeps the ledger normalization pass a fixed point.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases and strips diacritics ("Vigilância" -> "vigilancia").
pub fn normalize_text(text: &str) -> String {
    strip_diacritics(&text.to_lowercase())
}

/// Removes combining marks after canonical decomposition.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Title-cases every alphabetic run: the first letter is uppercased and the rest
/// lowercased ("FUNDAÇÃO municipal de" -> "Fundação Municipal De").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Returns the title-cased form of the first phrase (by list order) contained in
/// the object text, or `None` when no phrase matches.
///
/// Order is a priority: with `["vigilancia armada", "vigilancia"]` the text
/// "serviço de vigilância armada" maps to "Vigilancia Armada", with the order
/// swapped it maps to "Vigilancia".
pub fn map_object_phrase(object_text: &str, phrases: &[String]) -> Option<String> {
    let normalized = normalize_text(object_text);
    phrases
        .iter()
        .map(|phrase| phrase.trim())
        .filter(|phrase| !phrase.is_empty())
        .find(|phrase| normalized.contains(&normalize_text(phrase)))
        .map(title_case)
}

/// Maps the object text to its canonical phrase, keeping the raw text when nothing
/// matches.
pub fn canonical_object(object_raw: &str, phrases: &[String]) -> String {
    map_object_phrase(object_raw, phrases).unwrap_or_else(|| object_raw.to_string())
}

/// Strips a known boilerplate prefix and title-cases the remainder.
///
/// Only a case-insensitive match at the very start qualifies; names without one of
/// the prefixes are title-cased unchanged.
pub fn clean_organization(organization: &str, prefixes: &[String]) -> String {
    for prefix in prefixes {
        if let Some(rest) = strip_prefix_ignore_case(organization, prefix) {
            return title_case(rest.trim());
        }
    }
    title_case(organization)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.to_lowercase();
    if prefix.is_empty() {
        return None;
    }

    let mut remaining = prefix.as_str();
    for (idx, c) in text.char_indices() {
        if remaining.is_empty() {
            return Some(&text[idx..]);
        }
        let lowered: String = c.to_lowercase().collect();
        remaining = remaining.strip_prefix(lowered.as_str())?;
    }

    remaining.is_empty().then_some("")
}
