use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use super::api::{DriveApi, SheetsApi};
use super::a1::quote_sheet_name;
use super::types::*;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

const SPREADSHEET_FIELDS: &str =
    "spreadsheetId,spreadsheetUrl,properties.title,sheets(properties,protectedRanges)";
const GRID_FIELDS: &str =
    "sheets(properties,merges,data(startRow,startColumn,rowData,rowMetadata,columnMetadata))";

/// Sheets v4 and Drive v3 over HTTPS with a bearer token
#[derive(Debug, Clone)]
pub struct HttpGoogleClient {
    client: reqwest::Client,
    sheets_base_url: String,
    drive_base_url: String,
    access_token: String,
}

impl HttpGoogleClient {
    pub fn new(api: &ApiConfig, access_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            sheets_base_url: api.sheets_base_url.trim_end_matches('/').to_string(),
            drive_base_url: api.drive_base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str, suffix: &str) -> String {
        format!("{}/spreadsheets/{}{}", self.sheets_base_url, spreadsheet_id, suffix)
    }

    fn drive_url(&self, path: &str) -> String {
        format!("{}/{}", self.drive_base_url, path)
    }

    /// Send the request and decode a JSON body, mapping Google error bodies
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: google_error_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(serde_json::from_value(json!({}))?);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull `error.message` out of a Google error body, falling back to the raw text
fn google_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Escape a value for a Drive `q` string literal
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

impl SheetsApi for HttpGoogleClient {
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let request = self
            .client
            .get(self.spreadsheet_url(spreadsheet_id, ""))
            .query(&[("fields", SPREADSHEET_FIELDS)]);
        self.send(request).await
    }

    async fn get_sheet_grid(&self, spreadsheet_id: &str, sheet_title: &str) -> Result<Option<Sheet>> {
        // A range naming a missing sheet is a 400, so check the tab list first
        let spreadsheet = self.get_spreadsheet(spreadsheet_id).await?;
        let exists = spreadsheet
            .sheets
            .iter()
            .any(|s| s.properties.title() == sheet_title);
        if !exists {
            return Ok(None);
        }

        let request = self
            .client
            .get(self.spreadsheet_url(spreadsheet_id, ""))
            .query(&[
                ("ranges", quote_sheet_name(sheet_title).as_str()),
                ("includeGridData", "true"),
                ("fields", GRID_FIELDS),
            ]);
        let with_grid: Spreadsheet = self.send(request).await?;

        Ok(with_grid
            .sheets
            .into_iter()
            .find(|s| s.properties.title() == sheet_title))
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse> {
        let body = BatchUpdateRequest { requests };
        let request = self
            .client
            .post(self.spreadsheet_url(spreadsheet_id, ":batchUpdate"))
            .json(&body);
        self.send(request).await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange> {
        let mut url = Url::parse(&self.spreadsheet_url(spreadsheet_id, "/values"))
            .map_err(|e| Error::Config(format!("Invalid Sheets base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Sheets base URL cannot take a path".to_string()))?
            .push(range);

        let request = self
            .client
            .get(url)
            .query(&[("valueRenderOption", render.query_value())]);
        self.send(request).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        input: ValueInputOption,
        data: Vec<ValueRange>,
    ) -> Result<()> {
        let body = BatchUpdateValuesRequest {
            value_input_option: input,
            data,
        };
        let request = self
            .client
            .post(self.spreadsheet_url(spreadsheet_id, "/values:batchUpdate"))
            .json(&body);
        let _: Value = self.send(request).await?;
        Ok(())
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet> {
        let request = self
            .client
            .post(format!("{}/spreadsheets", self.sheets_base_url))
            .json(&json!({ "properties": { "title": title } }));
        self.send(request).await
    }
}

impl DriveApi for HttpGoogleClient {
    async fn current_user_email(&self) -> Result<String> {
        let request = self
            .client
            .get(self.drive_url("about"))
            .query(&[("fields", "user(emailAddress)")]);
        let about: DriveAbout = self.send(request).await?;
        Ok(about.user.email_address)
    }

    async fn file_parents(&self, file_id: &str) -> Result<Vec<String>> {
        let request = self
            .client
            .get(self.drive_url(&format!("files/{}", file_id)))
            .query(&[("fields", "parents"), ("supportsAllDrives", "true")]);
        let file: DriveFile = self.send(request).await?;
        Ok(file.parents)
    }

    async fn find_folder(&self, parent_id: &str, name: &str) -> Result<Option<String>> {
        let query = format!(
            "'{}' in parents and name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_value(parent_id),
            escape_query_value(name),
            FOLDER_MIME_TYPE
        );
        let request = self.client.get(self.drive_url("files")).query(&[
            ("q", query.as_str()),
            ("fields", "files(id,name)"),
            ("pageSize", "1"),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ]);
        let list: DriveFileList = self.send(request).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        let request = self
            .client
            .post(self.drive_url("files"))
            .query(&[("fields", "id"), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent_id],
            }));
        let file: DriveFile = self.send(request).await?;
        Ok(file.id)
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<()> {
        let previous = self.file_parents(file_id).await?;
        let remove = previous
            .iter()
            .filter(|p| p.as_str() != folder_id)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");

        let request = self
            .client
            .patch(self.drive_url(&format!("files/{}", file_id)))
            .query(&[
                ("addParents", folder_id),
                ("removeParents", remove.as_str()),
                ("fields", "id,parents"),
                ("supportsAllDrives", "true"),
            ])
            .json(&json!({}));
        let _: DriveFile = self.send(request).await?;
        Ok(())
    }
}
