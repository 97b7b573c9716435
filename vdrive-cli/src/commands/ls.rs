use tabled::{Table, Tabled};

use crate::commands::{ensure_setup, open_session};
use crate::error::Result;
use crate::utils;

#[derive(Tabled)]
struct EntryInfo {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Size")]
    size: String,
}

pub async fn execute(path: &str) -> Result<()> {
    let path = utils::parse_path(path)?;
    let session = open_session()?;
    if !ensure_setup(&session) {
        return Ok(());
    }

    utils::print_header(&format!("Contents of {path}"));
    let listing = session.navigate(&path)?;

    if listing.is_empty() {
        utils::print_info("This folder is empty.");
        return Ok(());
    }

    let rows: Vec<EntryInfo> = listing
        .folders
        .into_iter()
        .map(|name| EntryInfo {
            name,
            kind: "folder",
            size: String::new(),
        })
        .chain(listing.files.into_iter().map(|file| EntryInfo {
            name: file.name,
            kind: "file",
            size: format!("{} KB", file.size_kb),
        }))
        .collect();

    let len = rows.len();
    println!("{}", Table::new(rows));
    println!();
    utils::print_info(&format!("{len} item(s)"));
    Ok(())
}
