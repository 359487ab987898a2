use crate::config::ResolvedConfig;
use crate::constants::{OBJECT_HEADER, ORGANIZATION_HEADER};
use crate::errors::{AppError, AppResult};
use crate::ledger::{CellRange, Ledger};
use crate::normalizer::{canonical_object, clean_organization};
use tracing::info;

/// Counters of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub rows: usize,
    pub objects_changed: usize,
    pub organizations_changed: usize,
}

/// Rewrites the object and organization columns of the ledger in place.
///
/// Objects are mapped to their canonical phrase (kept as-is when none matches) and
/// organizations lose their boilerplate prefix. Running the pass twice changes
/// nothing the second time.
///
/// # Errors
///
/// Returns `InvalidInput` when the header row lacks either column, or any ledger
/// error from reading or writing.
pub async fn normalize_ledger(
    ledger: &dyn Ledger,
    config: &ResolvedConfig,
) -> AppResult<NormalizeSummary> {
    let rows = ledger.read_all().await?;
    let header_idx = config.header_row.max(1) as usize - 1;

    if rows.len() <= header_idx + 1 {
        info!("No data below the header, nothing to normalize");
        return Ok(NormalizeSummary::default());
    }

    let header = &rows[header_idx];
    let object_col = find_column(header, OBJECT_HEADER)?;
    let organization_col = find_column(header, ORGANIZATION_HEADER)?;

    let normalize = config.normalize();
    let data = &rows[header_idx + 1..];
    let mut summary = NormalizeSummary {
        rows: data.len(),
        ..NormalizeSummary::default()
    };

    let mut objects = Vec::with_capacity(data.len());
    let mut organizations = Vec::with_capacity(data.len());
    for row in data {
        let object = cell(row, object_col);
        let mapped = canonical_object(object, normalize.object_phrases);
        if mapped != object {
            summary.objects_changed += 1;
        }
        objects.push(vec![mapped]);

        let organization = cell(row, organization_col);
        let cleaned = clean_organization(organization, normalize.org_prefixes);
        if cleaned != organization {
            summary.organizations_changed += 1;
        }
        organizations.push(vec![cleaned]);
    }

    let first_row = config.header_row + 1;
    let row_count = data.len() as u32;

    info!(rows = objects.len(), column = OBJECT_HEADER, "Updating objects");
    ledger
        .update_range(
            &objects,
            &CellRange::column(object_col as u32 + 1, first_row, row_count),
        )
        .await?;
    tokio::time::sleep(config.timeouts().persist_delay).await;

    info!(
        rows = organizations.len(),
        column = ORGANIZATION_HEADER,
        "Updating organizations"
    );
    ledger
        .update_range(
            &organizations,
            &CellRange::column(organization_col as u32 + 1, first_row, row_count),
        )
        .await?;

    info!(
        rows = summary.rows,
        objects_changed = summary.objects_changed,
        organizations_changed = summary.organizations_changed,
        "Normalization finished"
    );
    Ok(summary)
}

fn find_column(header: &[String], label: &str) -> AppResult<usize> {
    header
        .iter()
        .position(|h| h.trim() == label)
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Column '{label}' not found in the header row"))
        })
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}
