use crate::error::{Error, Result};
use crate::google::DriveApi;

/// Id of the `folder_name` subfolder next to `spreadsheet_id`, created on
/// first use.
pub async fn resolve_or_create_folder<D: DriveApi>(
    drive: &D,
    spreadsheet_id: &str,
    folder_name: &str,
) -> Result<String> {
    let parents = drive.file_parents(spreadsheet_id).await?;
    let parent = parents
        .first()
        .ok_or_else(|| Error::NoParentFolder(spreadsheet_id.to_string()))?;

    if let Some(id) = drive.find_folder(parent, folder_name).await? {
        log::debug!("[resolve_or_create_folder] reusing '{}' ({})", folder_name, id);
        return Ok(id);
    }

    let id = drive.create_folder(parent, folder_name).await?;
    log::info!("[resolve_or_create_folder] created '{}' ({}) in {}", folder_name, id, parent);
    Ok(id)
}
