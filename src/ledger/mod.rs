//! External tabular store holding discovered opportunities.
//!
//! The rest of the crate works with named [`Record`] values; only this module knows
//! the positional column layout of the sheet.

mod auth;
mod memory;
mod sheets;

pub use memory::MemoryLedger;
pub use sheets::SheetsLedger;

use crate::errors::AppResult;
use crate::models::Record;
use async_trait::async_trait;

/// Number of columns written per record, without and with the estimated value.
pub const BASE_COLUMNS: u32 = 9;
pub const VALUE_COLUMNS: u32 = 10;

/// How the store interprets appended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Values are parsed as if typed by a user (dates, numbers).
    UserEntered,
    /// Values are stored verbatim.
    Raw,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
            Self::Raw => "RAW",
        }
    }
}

/// Rectangular cell region, 1-based and inclusive. An open `end_row` extends to the
/// last row of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: Option<u32>,
}

impl CellRange {
    /// All rows below `header_row`, across `columns` columns starting at A.
    pub fn below_header(header_row: u32, columns: u32) -> Self {
        Self {
            start_col: 1,
            start_row: header_row + 1,
            end_col: columns.max(1),
            end_row: None,
        }
    }

    /// A single column from `start_row` spanning `rows` rows.
    pub fn column(col: u32, start_row: u32, rows: u32) -> Self {
        Self {
            start_col: col,
            start_row,
            end_col: col,
            end_row: Some(start_row + rows.saturating_sub(1)),
        }
    }

    /// A1 notation without a sheet prefix, e.g. `A2:J` or `G2:G40`.
    pub fn a1(&self) -> String {
        let end_row = self.end_row.map(|r| r.to_string()).unwrap_or_default();
        format!(
            "{}{}:{}{}",
            column_letter(self.start_col),
            self.start_row,
            column_letter(self.end_col),
            end_row
        )
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row
            && self.end_row.map_or(true, |end| row <= end)
            && col >= self.start_col
            && col <= self.end_col
    }
}

/// Converts a 1-based column index into its letter name (1 -> A, 27 -> AA).
pub fn column_letter(col: u32) -> String {
    let mut n = col.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Positional row for a record:
/// `[status, publishedDate, proposalDeadline, region, organization, listingNumber,
/// objectText, link, foundDate, estimatedValue?]`.
///
/// # Arguments
///
/// * `record` - The finalized opportunity
/// * `include_estimated_value` - Whether the sheet carries the tenth value column
///
/// # Returns
///
/// [`BASE_COLUMNS`] fields, or [`VALUE_COLUMNS`] when the value column is included.
/// The link always lands in column H, which the dedup seed reads back.
pub fn record_row(record: &Record, include_estimated_value: bool) -> Vec<String> {
    let mut row = vec![
        record.status.clone(),
        record.published_date.clone(),
        record.proposal_deadline.clone(),
        record.region.clone(),
        record.organization.clone(),
        record.listing_number.clone(),
        record.object_text.clone(),
        record.link.clone(),
        record.found_date.clone(),
    ];
    if include_estimated_value {
        row.push(record.estimated_value_formatted.clone());
    }
    row
}

/// Number of columns a record occupies.
pub fn row_width(include_estimated_value: bool) -> u32 {
    if include_estimated_value {
        VALUE_COLUMNS
    } else {
        BASE_COLUMNS
    }
}

/// Operations the pipeline needs from the store.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Clears cell contents in the range; rows themselves are kept.
    async fn clear_range(&self, range: &CellRange) -> AppResult<()>;

    /// Values of a 1-based column from `from_row` down, in row order.
    async fn read_column(&self, column: u32, from_row: u32) -> AppResult<Vec<String>>;

    /// Every populated row of the sheet, header included.
    async fn read_all(&self) -> AppResult<Vec<Vec<String>>>;

    /// Appends one row after the last populated row.
    async fn append_row(&self, fields: &[String], mode: InputMode) -> AppResult<()>;

    /// Overwrites the range positionally with `values` (row-major).
    async fn update_range(&self, values: &[Vec<String>], range: &CellRange) -> AppResult<()>;
}
