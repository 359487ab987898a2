use super::auth::ServiceAccount;
use super::{column_letter, CellRange, InputMode, Ledger};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// One worksheet of a Google spreadsheet, accessed through the Sheets v4 REST API.
pub struct SheetsLedger {
    client: reqwest::Client,
    auth: ServiceAccount,
    spreadsheet_id: String,
    sheet: String,
}

impl SheetsLedger {
    /// Authenticates with the service account key and opens `sheet` of the
    /// spreadsheet named `spreadsheet`.
    ///
    /// # Errors
    ///
    /// Returns `SetupFailure` when the key cannot be used, the spreadsheet is not
    /// shared with the service account, or the worksheet does not exist.
    pub async fn connect(credentials: &Path, spreadsheet: &str, sheet: &str) -> AppResult<Self> {
        let client = reqwest::Client::new();
        let auth = ServiceAccount::from_file(client.clone(), credentials)
            .map_err(|e| AppError::SetupFailure(e.to_string()))?;

        let mut ledger = Self {
            client,
            auth,
            spreadsheet_id: String::new(),
            sheet: sheet.to_string(),
        };
        ledger.spreadsheet_id = ledger
            .find_spreadsheet_id(spreadsheet)
            .await
            .map_err(|e| AppError::SetupFailure(e.to_string()))?;
        ledger
            .ensure_sheet_exists()
            .await
            .map_err(|e| AppError::SetupFailure(e.to_string()))?;

        info!(
            spreadsheet = spreadsheet,
            sheet = sheet,
            "Connected to spreadsheet"
        );
        Ok(ledger)
    }

    async fn find_spreadsheet_id(&self, name: &str) -> AppResult<String> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .get(DRIVE_FILES_API)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await?;
        let list: DriveFileList = parse_response(response).await?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| {
                AppError::PersistenceError(format!(
                    "Spreadsheet '{name}' not found or not shared with the service account"
                ))
            })
    }

    async fn ensure_sheet_exists(&self) -> AppResult<()> {
        let url = self.api_url(&[])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = parse_response(response).await?;

        if meta.sheets.iter().any(|s| s.properties.title == self.sheet) {
            Ok(())
        } else {
            Err(AppError::PersistenceError(format!(
                "Worksheet '{}' not found",
                self.sheet
            )))
        }
    }

    /// Sheet-qualified A1 range, e.g. `'Página1'!A2:J`.
    fn qualified(&self, a1: &str) -> String {
        format!("'{}'!{a1}", self.sheet.replace('\'', "''"))
    }

    /// `spreadsheets/{id}/{segments...}` with every segment percent-encoded.
    fn api_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(SHEETS_API)?;
        url.path_segments_mut()
            .map_err(|_| AppError::UrlError(format!("{SHEETS_API} cannot be a base")))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }
}

/// Decodes a successful JSON response, reporting HTTP failures with their body.
async fn parse_response<T>(response: reqwest::Response) -> AppResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::PersistenceError(format!(
            "HTTP {status}: {}",
            body.trim()
        )));
    }
    Ok(response.json::<T>().await?)
}

/// Query parameters of `values:append`.
///
/// `OVERWRITE` writes into the first empty row after the table, so rows blanked by
/// a rebuild clear are filled again instead of being pushed down.
fn append_params(mode: InputMode) -> [(&'static str, &'static str); 2] {
    [
        ("valueInputOption", mode.as_str()),
        ("insertDataOption", "OVERWRITE"),
    ]
}

async fn expect_success(response: reqwest::Response) -> AppResult<()> {
    parse_response::<serde_json::Value>(response).await.map(|_| ())
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn clear_range(&self, range: &CellRange) -> AppResult<()> {
        let target = self.qualified(&range.a1());
        let url = self.api_url(&["values", &format!("{target}:clear")])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        expect_success(response).await?;
        debug!(range = %target, "Range cleared");
        Ok(())
    }

    async fn read_column(&self, column: u32, from_row: u32) -> AppResult<Vec<String>> {
        let letter = column_letter(column);
        let target = self.qualified(&format!("{letter}{}:{letter}", from_row.max(1)));
        let url = self.api_url(&["values", &target])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("majorDimension", "COLUMNS")])
            .send()
            .await?;
        let range: ValueRange = parse_response(response).await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn read_all(&self) -> AppResult<Vec<Vec<String>>> {
        let target = self.qualified("A:ZZ");
        let url = self.api_url(&["values", &target])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;
        let range: ValueRange = parse_response(response).await?;
        Ok(range.values)
    }

    async fn append_row(&self, fields: &[String], mode: InputMode) -> AppResult<()> {
        let target = self.qualified("A1");
        let url = self.api_url(&["values", &format!("{target}:append")])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&append_params(mode))
            .json(&json!({ "values": [fields] }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn update_range(&self, values: &[Vec<String>], range: &CellRange) -> AppResult<()> {
        let target = self.qualified(&range.a1());
        let url = self.api_url(&["values", &target])?;
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", InputMode::Raw.as_str())])
            .json(&json!({
                "range": target,
                "majorDimension": "ROWS",
                "values": values,
            }))
            .send()
            .await?;
        expect_success(response).await?;
        debug!(range = %target, rows = values.len(), "Range updated");
        Ok(())
    }
}
