use crate::classes::{self, CreateClassesOutcome, ProtectionOutcome, WorkbookHooks};
use crate::config::Config;
use crate::context::ActiveContext;
use crate::error::Error;
use crate::google::{DriveApi, HttpGoogleClient, SheetsApi};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::replica::{self, ReplicaOutcome};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub struct AppState<G, N> {
    pub config: Config,
    pub google: G,
    pub notifier: N,
    /// Editor given on the command line; wins over the config file
    pub user_email: Option<String>,
}

impl AppState<HttpGoogleClient, ConsoleNotifier> {
    pub fn from_config(config: Config, user_email: Option<String>) -> Result<Self, CommandError> {
        let token = config.auth.resolve_token()?;
        let google = HttpGoogleClient::new(&config.api, token)?;
        Ok(AppState {
            config,
            google,
            notifier: ConsoleNotifier,
            user_email,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<Error> for CommandError {
    fn from(e: Error) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

/// Command-line flag, then config file, then the Drive account
async fn resolve_user<G: DriveApi, N: Notifier>(state: &AppState<G, N>) -> Result<String, CommandError> {
    if let Some(email) = state
        .user_email
        .clone()
        .or_else(|| state.config.auth.user_email.clone())
        .filter(|e| !e.trim().is_empty())
    {
        return Ok(email.trim().to_string());
    }

    let email = state.google.current_user_email().await.map_err(|e| {
        state.notifier.alert(&e.to_string());
        e
    })?;
    log::debug!("[resolve_user] using Drive account {}", email);
    Ok(email)
}

// ==================== Class Sheet Commands ====================

/// Create the missing class sheets listed on the control sheet
pub async fn create_classes<G, N>(
    state: &AppState<G, N>,
    spreadsheet_id: String,
) -> Result<CreateClassesOutcome, CommandError>
where
    G: SheetsApi + DriveApi,
    N: Notifier,
{
    let user = resolve_user(state).await?;
    let context = ActiveContext::new(spreadsheet_id, user);
    let hooks = WorkbookHooks::new(&state.google, state.config.classes.aggregate.as_ref());

    let outcome = classes::create_class_sheets(
        &state.google,
        &hooks,
        &state.notifier,
        &context,
        &state.config.classes,
    )
    .await?;

    println!(
        "[create_classes] created: {}, already present: {}",
        outcome.created.len(),
        outcome.existing.len()
    );
    Ok(outcome)
}

/// Drop whole-sheet protections from the sheets named in the cleanup range
pub async fn remove_protections<G, N>(
    state: &AppState<G, N>,
    spreadsheet_id: String,
) -> Result<ProtectionOutcome, CommandError>
where
    G: SheetsApi + DriveApi,
    N: Notifier,
{
    let user = resolve_user(state).await?;
    let context = ActiveContext::new(spreadsheet_id, user);
    let outcome =
        classes::remove_protections(&state.google, &state.notifier, &context, &state.config.classes).await?;
    Ok(outcome)
}

/// Re-apply class-sheet protection to every existing roster sheet
pub async fn reprotect<G, N>(
    state: &AppState<G, N>,
    spreadsheet_id: String,
) -> Result<ProtectionOutcome, CommandError>
where
    G: SheetsApi + DriveApi,
    N: Notifier,
{
    let user = resolve_user(state).await?;
    let context = ActiveContext::new(spreadsheet_id, user);
    let outcome =
        classes::reprotect_class_sheets(&state.google, &state.notifier, &context, &state.config.classes).await?;
    Ok(outcome)
}

// ==================== Replica Commands ====================

/// Replicate the template for the student shown on `sheet`
pub async fn replicate<G, N>(
    state: &AppState<G, N>,
    spreadsheet_id: String,
    sheet: String,
) -> Result<ReplicaOutcome, CommandError>
where
    G: SheetsApi + DriveApi,
    N: Notifier,
{
    let user = resolve_user(state).await?;
    let context = ActiveContext::new(spreadsheet_id, user).with_sheet(sheet);

    let outcome = replica::replicate_sheet(
        &state.google,
        &state.google,
        &state.notifier,
        &context,
        &state.config.replica,
        chrono::Utc::now(),
    )
    .await?;

    for warning in &outcome.warnings {
        println!(
            "[replicate] field '{}' ({}) not copied: {}",
            warning.field, warning.cell, warning.message
        );
    }
    Ok(outcome)
}

// ==================== Config Commands ====================

/// Write a config file with every default spelled out
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf, CommandError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path().ok_or_else(|| CommandError {
            message: "No config directory on this platform; pass --config".to_string(),
        })?,
    };

    if path.exists() && !force {
        return Err(CommandError {
            message: format!("{} already exists (use --force to overwrite)", path.display()),
        });
    }

    Config::default().save(&path)?;
    println!("[init_config] wrote {}", path.display());
    Ok(path)
}
