use crate::constants::OPEN_STATUS;
use serde::Deserialize;

/// One (keyword, region) pair to search for on the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub region: String,
}

/// Listing summary parsed from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStub {
    /// Absolute portal link, unique per listing.
    pub link: String,
    pub title: String,
    pub published_date_raw: String,
    pub organization_raw: String,
    pub region_raw: String,
    pub object_raw: String,
    pub listing_number_raw: String,
}

/// Fields only available on a listing's own page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    pub proposal_deadline_raw: String,
    /// Sum of quantity x unit reference value over every item row; never negative.
    pub estimated_value: f64,
}

/// A finalized opportunity, ready to be written to the ledger exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub status: String,
    pub published_date: String,
    pub proposal_deadline: String,
    pub region: String,
    pub organization: String,
    pub listing_number: String,
    pub object_text: String,
    pub link: String,
    pub found_date: String,
    pub estimated_value_formatted: String,
}

impl Record {
    /// Assembles a record from a stub that survived filtering and its detail page.
    ///
    /// `organization` and `object_text` are expected to be normalized already.
    pub fn assemble(
        stub: &ListingStub,
        detail: &ListingDetail,
        organization: String,
        object_text: String,
        found_date: String,
        estimated_value_formatted: String,
    ) -> Self {
        Self {
            status: OPEN_STATUS.to_string(),
            published_date: stub.published_date_raw.clone(),
            proposal_deadline: detail.proposal_deadline_raw.clone(),
            region: stub.region_raw.clone(),
            organization,
            listing_number: stub.listing_number_raw.clone(),
            object_text,
            link: stub.link.clone(),
            found_date,
            estimated_value_formatted,
        }
    }
}

/// How the ledger is prepared before crawling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Clear every data row below the header, then crawl from scratch.
    Rebuild,
    /// Keep stored rows and skip links that are already present.
    Incremental,
}

impl SyncMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Rebuild => "rebuild",
            Self::Incremental => "incremental",
        }
    }
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::Rebuild
    }
}
