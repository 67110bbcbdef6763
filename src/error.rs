//! Error types shared by the class-sheet and replica workflows.

/// All errors that can occur while talking to Google or running a workflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The template sheet used for class duplication is not in the workbook.
    #[error("Sheet '{0}' not found!")]
    TemplateSheetMissing(String),

    /// The replica template sheet is not in the template spreadsheet.
    #[error("Sheet \"{sheet}\" not found in the source spreadsheet {spreadsheet_id}!")]
    TemplateNotFound {
        spreadsheet_id: String,
        sheet: String,
    },

    /// A field used by the replica is missing from the field map.
    #[error("Field '{0}' is not defined in the field map")]
    UnmappedField(String),

    /// The identifying field read from the active sheet is empty.
    #[error("{field} not found in cell {cell} of the active sheet")]
    EmptyField { field: String, cell: String },

    /// The active spreadsheet has no parent folder in Drive.
    #[error("Spreadsheet {0} is not stored in any Drive folder")]
    NoParentFolder(String),

    /// Invalid A1 cell reference or range.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// A batch reply did not carry the expected payload.
    #[error("Reply {index} of the batch update has no {kind}")]
    MissingReply { index: usize, kind: &'static str },

    /// Google answered with a non-success status.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading or writing configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or incomplete configuration.
    #[error("Configuration: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Precondition errors abort immediately and are never worth retrying.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::TemplateSheetMissing(_)
                | Error::TemplateNotFound { .. }
                | Error::UnmappedField(_)
                | Error::EmptyField { .. }
                | Error::NoParentFolder(_)
        )
    }
}
