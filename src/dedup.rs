use std::collections::HashSet;

/// Links already persisted during the current run.
///
/// A link is only marked after its record reached the ledger, so a listing that
/// failed midway can still be picked up when another query surfaces it again.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set with links read back from the ledger. Blank cells are ignored.
    pub fn with_seed<I>(links: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let seen = links
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { seen }
    }

    pub fn is_new(&self, link: &str) -> bool {
        !self.seen.contains(link)
    }

    pub fn mark_seen(&mut self, link: &str) {
        self.seen.insert(link.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
