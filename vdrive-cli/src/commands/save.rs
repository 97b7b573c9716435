use std::path::Path;

use tokio::fs;
use vdrive::library::data_url;
use vdrive::session::UploadKind;

use crate::commands::open_session;
use crate::error::{Result, VdriveCliError};
use crate::utils;

/// Reads a local file the way the upload dialog does: text as is, anything
/// else as a base64 data URL.
pub async fn read_payload(local: &Path, mime_type: &str, textual: bool) -> Result<String> {
    let bytes = fs::read(local).await?;
    if textual {
        String::from_utf8(bytes).map_err(|_| {
            VdriveCliError::Input(format!("{} is not valid UTF-8 text", local.display()))
        })
    } else {
        Ok(data_url::encode(mime_type, &bytes))
    }
}

pub async fn execute(local: &Path, destination: &str, name: Option<&str>) -> Result<()> {
    let folder = utils::parse_path(destination)?;
    let filename = match name {
        Some(name) => name.to_string(),
        None => utils::file_name(local)?,
    };
    let mime_type = utils::guess_mime(&filename);
    let textual = UploadKind::classify(&filename, &mime_type)
        .map(|kind| kind.is_textual())
        .unwrap_or(false);

    let payload = read_payload(local, &mime_type, textual).await?;
    let session = open_session()?;
    let size_kb = session.save_file_to_path(&folder, &filename, &payload, &mime_type)?;

    utils::print_success(&format!(
        "Saved {filename} to {folder} ({size_kb} KB)"
    ));
    Ok(())
}
