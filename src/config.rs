//! Settings for both workflows, stored as JSON in the user's config directory.
//!
//! Every field has a default matching the classroom workbook this tool was
//! written for, so a partial file only needs to name what differs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classes::types::{default_editable_regions, EditableRegion};
use crate::error::{Error, Result};
use crate::replica::types::FieldMap;

const CONFIG_DIR: &str = "class-sheets";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub classes: ClassSheetsConfig,
    pub replica: ReplicaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth access token; takes precedence over `token_env`
    pub access_token: Option<String>,
    /// Environment variable holding the access token
    pub token_env: String,
    /// Editor granted on protected class sheets; asked from Drive when unset
    pub user_email: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            token_env: "GOOGLE_OAUTH_TOKEN".to_string(),
            user_email: None,
        }
    }
}

impl AuthConfig {
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.trim().is_empty()) {
            return Ok(token.trim().to_string());
        }
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(Error::Config(format!(
                "No access token: set auth.access_token or the {} environment variable",
                self.token_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub sheets_base_url: String,
    pub drive_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Class-sheet creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSheetsConfig {
    /// Sheet holding the roster
    pub control_sheet: String,
    /// Roster column on the control sheet
    pub roster_range: String,
    /// Range scanned when removing protections
    pub cleanup_range: String,
    /// Sheet duplicated for each class
    pub template_sheet: String,
    /// Cell that receives the class name on each new sheet
    pub label_cell: String,
    /// Regions left editable under class-sheet protection
    pub editable_regions: Vec<EditableRegion>,
    /// Consolidated QUERY formula over all class sheets; skipped when unset
    pub aggregate: Option<AggregateConfig>,
}

impl Default for ClassSheetsConfig {
    fn default() -> Self {
        Self {
            control_sheet: "Piloto".to_string(),
            roster_range: "C4:C39".to_string(),
            cleanup_range: "C4:C40".to_string(),
            template_sheet: "Base".to_string(),
            label_cell: "A5".to_string(),
            editable_regions: default_editable_regions(),
            aggregate: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Sheet receiving the formula
    pub sheet: String,
    /// Cell receiving the formula
    pub cell: String,
    /// Range stacked from every class sheet
    pub source_range: String,
    /// Function argument separator of the workbook's locale: `;` where the
    /// decimal mark is a comma (pt_BR), `,` otherwise
    pub separator: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            sheet: "ALL".to_string(),
            cell: "A7".to_string(),
            source_range: "A7:R70".to_string(),
            separator: ";".to_string(),
        }
    }
}

/// ANANF replica settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    pub template_spreadsheet_id: String,
    pub template_sheet: String,
    /// Subfolder created next to the active workbook
    pub folder_name: String,
    pub title_prefix: String,
    /// Field whose value names the new spreadsheet; must be non-empty
    pub id_field: String,
    /// Field shown in the success message
    pub name_field: String,
    /// chrono format string for the title timestamp
    pub timestamp_format: String,
    /// Offset of the timestamp's time zone from UTC
    pub utc_offset_minutes: i32,
    pub fields: FieldMap,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            template_spreadsheet_id: "1PX47xrTnfC5jacdSpaQUWPXd0a2HusxiyhcOb6CSrYk".to_string(),
            template_sheet: "Doc_Ananf".to_string(),
            folder_name: "ANANF".to_string(),
            title_prefix: "ANANF_".to_string(),
            id_field: "RA".to_string(),
            name_field: "nomeAluno".to_string(),
            timestamp_format: "%Y/%m/%d %H:%M:%S".to_string(),
            // America/Sao_Paulo has had no daylight saving time since 2019
            utc_offset_minutes: -180,
            fields: FieldMap::default(),
        }
    }
}

impl Config {
    /// `<config_dir>/class-sheets/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path (which must exist) or the default location
    /// (falling back to defaults when there is no file yet).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Config::default()),
            },
        };

        if !path.exists() {
            if required {
                return Err(Error::Config(format!("File not found: {}", path.display())));
            }
            log::debug!("[config] no file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config = serde_json::from_str(&text)?;
        log::debug!("[config] loaded {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
