use crate::config::FilterConfig;
use crate::normalizer::normalize_text;

/// Result of checking a listing's object text against the exclusion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    /// Rejected because the normalized object text contains this exclusion entry.
    Excluded(String),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted)
    }
}

/// Rejects the object text when any exclusion substring occurs in it.
///
/// Both sides are lowercased with diacritics stripped before the plain substring
/// test, so "Construção de guarita de vigilância" is excluded by "guarita" even
/// though it also mentions "vigilancia". Entry order does not matter.
pub fn classify(object_raw: &str, filter: &FilterConfig<'_>) -> Classification {
    let normalized = normalize_text(object_raw);
    filter
        .exclusions
        .iter()
        .map(|entry| normalize_text(entry.trim()))
        .find(|entry| !entry.is_empty() && normalized.contains(entry.as_str()))
        .map_or(Classification::Accepted, Classification::Excluded)
}
