use crate::commands::open_session;
use crate::error::Result;
use crate::utils;

pub async fn execute(path: &str, name: &str) -> Result<()> {
    let parent = utils::parse_path(path)?;
    let session = open_session()?;
    let created = session.create_folder(&parent, name)?;
    utils::print_success(&format!("Created folder {created}"));
    Ok(())
}
