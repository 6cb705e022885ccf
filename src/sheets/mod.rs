//! Google Sheets reader
//!
//! Fetches one rectangular cell range via the `values.get` endpoint and
//! materializes it as a [`Table`]: first row = headers, remaining rows =
//! transactions. Any failure at this boundary (auth, network, empty range)
//! degrades to an empty table and is logged, never propagated.

pub mod auth;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::models::{Table, Value};
use self::auth::ServiceAccountKey;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Reads one configured range from one spreadsheet.
pub struct SheetsReader {
    credentials_file: PathBuf,
    spreadsheet_id: String,
    sheet_range: String,
    client: reqwest::Client,
}

impl SheetsReader {
    pub fn new(
        credentials_file: PathBuf,
        spreadsheet_id: String,
        sheet_range: String,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            credentials_file,
            spreadsheet_id,
            sheet_range,
            client,
        })
    }

    /// Fetch the configured range, returning an empty table on any failure.
    pub async fn read_or_empty(&self) -> Table {
        match self.fetch_table().await {
            Ok(table) => {
                log::info!(
                    "Data successfully retrieved from Google Sheets ({} rows).",
                    table.rows.len()
                );
                table
            }
            Err(e) => {
                log::error!("Failed to retrieve data from Google Sheets: {:#}", e);
                Table::empty()
            }
        }
    }

    async fn fetch_table(&self) -> Result<Table> {
        let key = ServiceAccountKey::from_file(&self.credentials_file)?;
        let token = auth::fetch_access_token(&self.client, &key).await?;
        log::info!("Authorization successful.");

        let url = format!(
            "{}/{}/values/{}",
            BASE_URL,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.sheet_range)
        );
        log::debug!("Fetching sheet range from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| anyhow!("Request failed for {}: {}", self.spreadsheet_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Sheets API error: {} - {}", status, body);
            return Err(anyhow!("HTTP error: {} - {}", status, body));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))?;

        Ok(parse_values_response(&data))
    }
}

/// Convert a `values.get` response body into a table.
///
/// The first value row becomes the headers; a missing or empty `values`
/// array yields an empty table with a warning.
fn parse_values_response(data: &serde_json::Value) -> Table {
    let values = match data.get("values").and_then(|v| v.as_array()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            log::warn!("No data found in the specified range.");
            return Table::empty();
        }
    };

    let headers: Vec<String> = values[0]
        .as_array()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<Value>> = values[1..]
        .iter()
        .filter_map(|row| row.as_array())
        .map(|row| row.iter().map(|cell| Value::Text(cell_text(cell))).collect())
        .collect();

    Table::new(headers, rows)
}

/// The API formats every cell as a string; tolerate bare scalars anyway.
fn cell_text(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_values_response() {
        let body = json!({
            "range": "Sheet1!A1:D3",
            "values": [
                ["date", "category", "sum rub"],
                ["2024-01-02", "food", "120.5"],
                ["2024-01-03", "rent", "900"],
            ]
        });

        let table = parse_values_response(&body);
        assert_eq!(table.headers, vec!["date", "category", "sum rub"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], Value::Text("food".to_string()));
    }

    #[test]
    fn test_parse_values_response_pads_short_rows() {
        let body = json!({
            "values": [
                ["date", "category", "sum rub"],
                ["2024-01-02"],
            ]
        });

        let table = parse_values_response(&body);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], Value::Empty);
    }

    #[test]
    fn test_parse_values_response_empty_range() {
        assert!(parse_values_response(&json!({ "values": [] })).is_empty());
        assert!(parse_values_response(&json!({ "range": "Sheet1!A1:D1" })).is_empty());
    }

    #[test]
    fn test_cell_text_tolerates_bare_scalars() {
        assert_eq!(cell_text(&json!("120,50")), "120,50");
        assert_eq!(cell_text(&json!(900)), "900");
        assert_eq!(cell_text(&json!(null)), "");
    }
}
