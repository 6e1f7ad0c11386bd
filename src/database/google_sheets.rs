// ==================== GOOGLE SHEETS BACKEND ====================
// Sheets v4 REST API for values and tab management, Drive v3 for sharing
// and deleting whole spreadsheets. Values are written RAW so phone numbers
// and national ids keep their leading zeros.

use super::{google_auth::ServiceAccountAuth, SheetBackend};
use crate::{config::GoogleConfig, utils::error::AppError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

pub struct GoogleSheets {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    share_with_email: Option<String>,
}

/// A1 notation needs tab titles quoted, with embedded quotes doubled.
pub fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Range covering one data row; data row 0 sits on sheet row 2.
pub fn row_range(tab: &str, index: usize) -> String {
    let sheet_row = index + 2;
    format!("{}!A{}", quote_tab(tab), sheet_row)
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Drops the header row and pads every record to the header width.
pub fn rows_from_values(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    let mut iter = values.into_iter();
    let width = match iter.next() {
        Some(header) => header.len(),
        None => return Vec::new(),
    };

    iter.map(|row| {
        let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        cells
    })
    .collect()
}

impl GoogleSheets {
    pub fn new(config: &GoogleConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let auth = ServiceAccountAuth::new(&config.service_account_email, &config.private_key, http.clone())?;

        Ok(Self {
            http,
            auth,
            share_with_email: config.share_with_email.clone(),
        })
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::error!("❌ Google API {} failed ({}): {}", action, status, body);
        Err(AppError::Store(format!("{} failed with status {}", action, status)))
    }

    fn values_url(book_id: &str, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE,
            book_id,
            urlencoding::encode(range)
        )
    }

    async fn sheet_properties(&self, book_id: &str) -> Result<Vec<SheetProperties>, AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(format!("{}/{}", SHEETS_API_BASE, book_id))
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .bearer_auth(token)
            .send()
            .await?;

        let meta: SpreadsheetMeta = Self::check(response, "read spreadsheet metadata")
            .await?
            .json()
            .await?;

        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn sheet_id(&self, book_id: &str, tab: &str) -> Result<i64, AppError> {
        self.sheet_properties(book_id)
            .await?
            .into_iter()
            .find(|p| p.title == tab)
            .map(|p| p.sheet_id)
            .ok_or_else(|| AppError::Store(format!("tab '{}' does not exist", tab)))
    }

    async fn batch_update(&self, book_id: &str, requests: Value, action: &str) -> Result<(), AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}/{}:batchUpdate", SHEETS_API_BASE, book_id))
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;

        Self::check(response, action).await?;
        Ok(())
    }

    async fn write_values(&self, book_id: &str, range: &str, rows: Vec<Vec<String>>) -> Result<(), AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .put(Self::values_url(book_id, range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": rows }))
            .send()
            .await?;

        Self::check(response, "write values").await?;
        Ok(())
    }

    async fn share(&self, book_id: &str, email: &str) -> Result<(), AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}/{}/permissions", DRIVE_API_BASE, book_id))
            .query(&[("sendNotificationEmail", "false")])
            .bearer_auth(token)
            .json(&json!({ "type": "user", "role": "writer", "emailAddress": email }))
            .send()
            .await?;

        Self::check(response, "share spreadsheet").await?;
        Ok(())
    }
}

#[async_trait]
impl SheetBackend for GoogleSheets {
    async fn create_book(&self, title: &str, tab: &str, header: &[&str]) -> Result<String, AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(SHEETS_API_BASE)
            .bearer_auth(token)
            .json(&json!({
                "properties": { "title": title },
                "sheets": [{ "properties": { "title": tab } }]
            }))
            .send()
            .await?;

        let created: CreatedSpreadsheet = Self::check(response, "create spreadsheet")
            .await?
            .json()
            .await?;

        let header_row = header.iter().map(|h| h.to_string()).collect();
        self.write_values(&created.spreadsheet_id, &format!("{}!A1", quote_tab(tab)), vec![header_row])
            .await?;

        if let Some(email) = &self.share_with_email {
            if let Err(e) = self.share(&created.spreadsheet_id, email).await {
                log::warn!("⚠️ Could not share spreadsheet {} with {}: {}", created.spreadsheet_id, email, e);
            }
        }

        log::info!("📗 Created spreadsheet '{}' ({})", title, created.spreadsheet_id);
        Ok(created.spreadsheet_id)
    }

    async fn delete_book(&self, book_id: &str) -> Result<(), AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .delete(format!("{}/{}", DRIVE_API_BASE, book_id))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check(response, "delete spreadsheet").await?;
        Ok(())
    }

    async fn list_tabs(&self, book_id: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .sheet_properties(book_id)
            .await?
            .into_iter()
            .map(|p| p.title)
            .collect())
    }

    async fn create_tab(&self, book_id: &str, tab: &str, header: &[&str]) -> Result<(), AppError> {
        if self.list_tabs(book_id).await?.iter().any(|t| t == tab) {
            return Ok(());
        }

        self.batch_update(
            book_id,
            json!([{ "addSheet": { "properties": { "title": tab } } }]),
            "add tab",
        )
        .await?;

        let header_row = header.iter().map(|h| h.to_string()).collect();
        self.write_values(book_id, &format!("{}!A1", quote_tab(tab)), vec![header_row])
            .await
    }

    async fn delete_tab(&self, book_id: &str, tab: &str) -> Result<(), AppError> {
        let sheet_id = self.sheet_id(book_id, tab).await?;
        self.batch_update(
            book_id,
            json!([{ "deleteSheet": { "sheetId": sheet_id } }]),
            "delete tab",
        )
        .await
    }

    async fn read_rows(&self, book_id: &str, tab: &str) -> Result<Vec<Vec<String>>, AppError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(Self::values_url(book_id, &quote_tab(tab)))
            .query(&[("majorDimension", "ROWS"), ("valueRenderOption", "FORMATTED_VALUE")])
            .bearer_auth(token)
            .send()
            .await?;

        let range: ValueRange = Self::check(response, "read values").await?.json().await?;
        Ok(rows_from_values(range.values))
    }

    async fn append_row(&self, book_id: &str, tab: &str, row: Vec<String>) -> Result<(), AppError> {
        let range = format!("{}!A1", quote_tab(tab));
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}:append", Self::values_url(book_id, &range)))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?;

        Self::check(response, "append row").await?;
        Ok(())
    }

    async fn update_row(&self, book_id: &str, tab: &str, index: usize, row: Vec<String>) -> Result<(), AppError> {
        self.write_values(book_id, &row_range(tab, index), vec![row]).await
    }

    async fn delete_row(&self, book_id: &str, tab: &str, index: usize) -> Result<(), AppError> {
        let sheet_id = self.sheet_id(book_id, tab).await?;
        // deleteDimension indexes are 0-based over sheet rows, header included
        let start = index + 1;
        self.batch_update(
            book_id,
            json!([{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": start + 1
                    }
                }
            }]),
            "delete row",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_quote_titles() {
        assert_eq!(quote_tab("Tech Day"), "'Tech Day'");
        assert_eq!(quote_tab("Ann's Party"), "'Ann''s Party'");
        assert_eq!(row_range("Expo", 0), "'Expo'!A2");
        assert_eq!(row_range("Expo", 9), "'Expo'!A11");
    }

    #[test]
    fn test_rows_from_values_skips_header_and_pads() {
        let values = vec![
            vec![json!("name"), json!("phone"), json!("email")],
            vec![json!("Ann"), json!("0100")],
            vec![json!("Bob"), json!(42), json!("b@x.io")],
        ];
        let rows = rows_from_values(values);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Ann", "0100", ""]);
        assert_eq!(rows[1], vec!["Bob", "42", "b@x.io"]);
        assert!(rows_from_values(Vec::new()).is_empty());
    }
}
