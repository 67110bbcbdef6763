//! The external API boundary. Workflows only talk to Google through these
//! traits, so tests can run them against an in-memory backend.

use crate::error::Result;
use crate::google::types::{
    BatchUpdateResponse, Request, Sheet, Spreadsheet, ValueInputOption, ValueRange, ValueRenderOption,
};

#[allow(async_fn_in_trait)]
pub trait SheetsApi {
    /// Spreadsheet metadata: sheet properties and protected ranges, no cell data
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet>;

    /// One sheet with full grid data, dimension metadata and merges
    async fn get_sheet_grid(&self, spreadsheet_id: &str, sheet_title: &str) -> Result<Option<Sheet>>;

    /// Apply all requests atomically; replies come back in request order
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse>;

    /// Values of an A1 range, as display text or typed
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange>;

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        input: ValueInputOption,
        data: Vec<ValueRange>,
    ) -> Result<()>;

    /// Create an empty spreadsheet with one default sheet
    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet>;
}

#[allow(async_fn_in_trait)]
pub trait DriveApi {
    /// Email of the authenticated user
    async fn current_user_email(&self) -> Result<String>;

    async fn file_parents(&self, file_id: &str) -> Result<Vec<String>>;

    async fn find_folder(&self, parent_id: &str, name: &str) -> Result<Option<String>>;

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<String>;

    /// Make `folder_id` the only parent of `file_id`
    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<()>;
}
