use crate::commands::{ensure_setup, open_session};
use crate::error::Result;
use crate::utils;

pub async fn execute(path: &str, depth: usize) -> Result<()> {
    let path = utils::parse_path(path)?;
    let session = open_session()?;
    if !ensure_setup(&session) {
        return Ok(());
    }

    utils::print_header(&format!("Tree of {path}"));
    let directory = session.vfs().resolve(&path)?;
    for line in directory.render_tree(&path.to_string(), depth) {
        println!("{line}");
    }
    Ok(())
}
