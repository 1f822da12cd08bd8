//! Shared helpers for command handlers.

use std::path::Path;
use std::sync::Arc;

use tripdesk_core::FilePart;
use tripdesk_core::model::EntityId;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read an image for upload, guessing the MIME type from the extension.
pub fn read_image(path: &Path) -> Result<FilePart, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".into(), |n| n.to_string_lossy().into_owned());
    Ok(FilePart::new(file_name, mime_for(path), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn read_optional_image(path: Option<&Path>) -> Result<Option<FilePart>, CliError> {
    path.map(read_image).transpose()
}

/// Unwrap a single-entity query, turning the `None` sentinel into NotFound.
pub fn found<T: Clone>(
    entity: &Arc<Option<T>>,
    resource_type: &str,
    id: &EntityId,
    list_command: &str,
) -> Result<T, CliError> {
    Option::as_ref(entity).cloned().ok_or_else(|| CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: id.to_string(),
        list_command: list_command.into(),
    })
}

/// Prompt for a password without echo.
pub fn prompt_password(prompt: &str) -> Result<String, CliError> {
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_for(Path::new("beach.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("poster.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn missing_entity_is_not_found() {
        let id = EntityId::from("t9");
        let err = found::<u8>(&Arc::new(None), "trip", &id, "trips list").unwrap_err();
        assert_eq!(err.to_string(), "trip 't9' not found");
    }

    #[test]
    fn image_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let part = read_image(&path).unwrap();
        assert_eq!(part.file_name, "cover.png");
        assert_eq!(part.mime, "image/png");
        assert_eq!(part.bytes.len(), 4);
    }
}
