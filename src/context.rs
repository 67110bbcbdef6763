use serde::{Deserialize, Serialize};

/// Who is running an operation and on what; passed explicitly instead of
/// being read from an ambient session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContext {
    pub spreadsheet_id: String,
    /// The sheet the user is looking at, when the operation needs one
    pub active_sheet: Option<String>,
    /// Invoking user; becomes the sole editor of protected ranges
    pub user_email: String,
}

impl ActiveContext {
    pub fn new(spreadsheet_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            active_sheet: None,
            user_email: user_email.into(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.active_sheet = Some(sheet.into());
        self
    }
}
