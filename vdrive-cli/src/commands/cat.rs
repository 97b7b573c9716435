use std::path::Path;

use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use vdrive::Session;
use vdrive::library::data_url;

use crate::commands::open_session;
use crate::error::{Result, VdriveCliError};
use crate::utils;

fn load_payload(session: &Session, path: &str) -> Result<String> {
    let (folder, filename) = utils::split_file_path(path)?;
    session
        .open_file(&folder, &filename)
        .ok_or_else(|| VdriveCliError::NotFound(format!("no content stored for {path}")))
}

pub async fn execute(path: &str, output: Option<&Path>) -> Result<()> {
    let payload = load_payload(&open_session()?, path)?;

    let is_binary = data_url::is_data_url(&payload)
        && !data_url::mime_type(&payload).is_some_and(|m| m.starts_with("text/"));
    let bytes = if data_url::is_data_url(&payload) {
        data_url::decode(&payload).ok_or_else(|| {
            VdriveCliError::RuntimeError(format!("{path} holds a malformed data URL"))
        })?
    } else {
        payload.into_bytes()
    };

    match output {
        Some(output) => {
            fs::write(output, &bytes).await?;
            utils::print_success(&format!(
                "Wrote {} to {}",
                utils::format_size(bytes.len() as u64),
                output.display()
            ));
        }
        None if is_binary => {
            utils::print_info(&format!(
                "{path} is binary ({}); use --output to export it",
                utils::format_size(bytes.len() as u64)
            ));
        }
        None => {
            io::stdout().write_all(&bytes).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vdrive::store::MemoryStore;

    use super::*;

    #[test]
    fn test_load_payload() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.setup_drives(1, &[1024]).unwrap();
        let docs = utils::parse_path(r"C:\Docs").unwrap();
        session
            .save_file_to_path(&docs, "a.txt", "hello", "text/plain")
            .unwrap();

        assert_eq!(load_payload(&session, r"C:\Docs\a.txt").unwrap(), "hello");

        // seeded entries have no stored content
        let err = load_payload(&session, r"C:\Windows\bootmgr").unwrap_err();
        assert_eq!(
            err.to_string(),
            r"Not found: no content stored for C:\Windows\bootmgr"
        );
    }
}
