use std::path::Path;

use console::style;
use vdrive::session::UploadKind;

use crate::commands::open_session;
use crate::commands::save::read_payload;
use crate::error::{Result, VdriveCliError};
use crate::utils;

pub async fn execute(local: &Path, destination: &str, description: Option<&str>) -> Result<()> {
    let folder = utils::parse_path(destination)?;
    let name = utils::file_name(local)?;
    let mime_type = utils::guess_mime(&name);
    let kind = UploadKind::classify(&name, &mime_type).ok_or_else(|| {
        VdriveCliError::Input(format!(
            "{name} ({mime_type}) is not an image, text or code file"
        ))
    })?;

    let payload = read_payload(local, &mime_type, kind.is_textual()).await?;
    let session = open_session()?;
    let record = session.upload(&folder, &name, &payload, &mime_type, description)?;

    utils::print_success(&format!(
        "Uploaded {name} to {folder} as {} #{}",
        record.kind().as_str(),
        record.id()
    ));
    utils::print_info(&format!(
        "Library file: {} (vdrive show {} {})",
        style(record.filename()).cyan(),
        record.shelf(),
        record.id()
    ));
    Ok(())
}
